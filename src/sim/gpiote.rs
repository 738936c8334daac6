//! GPIOTE model: eight channels, each either watching a pin for an edge
//! (event mode) or owning a pin and driving it from tasks (task mode).

use core::cell::RefCell;
use std::rc::Rc;

use log::warn;

use super::{Signal, SocState};
use crate::hw::{EventAddr, GpioteChannelHw, Level, PinTask, Polarity, Pull, TaskAddr};

pub const GPIOTE_CHANNELS: usize = 8;

pub(super) const GPIOTE_BASE: u32 = 0x4000_6000;

const TASKS_OUT: u32 = 0x000;
const TASKS_SET: u32 = 0x030;
const TASKS_CLR: u32 = 0x060;
const EVENTS_IN: u32 = 0x100;

pub(super) fn task_address(channel: usize, task: PinTask) -> u32 {
    let offset = match task {
        PinTask::Out => TASKS_OUT,
        PinTask::Set => TASKS_SET,
        PinTask::Clear => TASKS_CLR,
    };
    GPIOTE_BASE + offset + 4 * channel as u32
}

pub(super) fn event_address(channel: usize) -> u32 {
    GPIOTE_BASE + EVENTS_IN + 4 * channel as u32
}

fn in_bank(off: u32, bank: u32) -> Option<usize> {
    (bank..bank + 4 * GPIOTE_CHANNELS as u32)
        .contains(&off)
        .then(|| ((off - bank) / 4) as usize)
}

pub(super) fn decode_task(addr: u32) -> Option<(usize, PinTask)> {
    if addr & !0xFFF != GPIOTE_BASE {
        return None;
    }
    let off = addr & 0xFFF;
    in_bank(off, TASKS_OUT)
        .map(|ch| (ch, PinTask::Out))
        .or_else(|| in_bank(off, TASKS_SET).map(|ch| (ch, PinTask::Set)))
        .or_else(|| in_bank(off, TASKS_CLR).map(|ch| (ch, PinTask::Clear)))
}

pub(super) fn decode_event(addr: u32) -> Option<usize> {
    if addr & !0xFFF != GPIOTE_BASE {
        return None;
    }
    in_bank(addr & 0xFFF, EVENTS_IN)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum Mode {
    #[default]
    Disabled,
    Event { pin: u8, polarity: Polarity },
    Task { pin: u8, polarity: Polarity },
}

#[derive(Default)]
pub(super) struct GpioteState {
    pub mode: [Mode; GPIOTE_CHANNELS],
    pub events_in: [bool; GPIOTE_CHANNELS],
}

impl GpioteState {
    /// Event channels whose polarity matches a `from → to` change on `pin`.
    pub fn matching_events(&self, pin: u8, from: Level, to: Level) -> impl Iterator<Item = usize> + '_ {
        self.mode
            .iter()
            .enumerate()
            .filter_map(move |(ch, mode)| match *mode {
                Mode::Event { pin: p, polarity } if p == pin && polarity.matches(from, to) => Some(ch),
                _ => None,
            })
    }

    /// Pin and level a task drives, or `None` when the channel is not in
    /// task mode.
    pub fn task_output(&self, channel: usize, task: PinTask, current: impl Fn(u8) -> Level) -> Option<(u8, Level)> {
        let Mode::Task { pin, polarity } = self.mode[channel] else {
            return None;
        };
        let level = match task {
            PinTask::Set => Level::High,
            PinTask::Clear => Level::Low,
            PinTask::Out => match polarity {
                Polarity::LoToHi => Level::High,
                Polarity::HiToLo => Level::Low,
                Polarity::Toggle => !current(pin),
            },
        };
        Some((pin, level))
    }
}

/// Handle to one GPIOTE channel.
pub struct SimGpioteChannel {
    pub(super) soc: Rc<RefCell<SocState>>,
    pub(super) index: usize,
}

impl SimGpioteChannel {
    fn claim(soc: &mut SocState, index: usize, pin: u8) {
        let clash = soc
            .gpiote
            .mode
            .iter()
            .enumerate()
            .any(|(ch, mode)| ch != index && matches!(mode, Mode::Task { pin: p, .. } if *p == pin));
        if clash {
            warn!("sim: pin {} already owned by a task-mode channel", pin);
        }
    }
}

impl GpioteChannelHw for SimGpioteChannel {
    fn index(&self) -> u8 {
        self.index as u8
    }

    fn configure_event(&mut self, pin: u8, polarity: Polarity, pull: Pull) {
        let mut soc = self.soc.borrow_mut();
        soc.gpiote.mode[self.index] = Mode::Event { pin, polarity };
        soc.apply_pull(pin, pull);
    }

    fn configure_task(&mut self, pin: u8, polarity: Polarity, initial: Level) {
        let mut soc = self.soc.borrow_mut();
        Self::claim(&mut soc, self.index, pin);
        soc.gpiote.mode[self.index] = Mode::Task { pin, polarity };
        soc.raise(Signal::Pin(pin, initial));
        soc.settle();
    }

    fn event_address(&self) -> EventAddr {
        EventAddr(event_address(self.index))
    }

    fn task_address(&self, task: PinTask) -> TaskAddr {
        TaskAddr(task_address(self.index, task))
    }

    fn event_pending(&self) -> bool {
        self.soc.borrow().gpiote.events_in[self.index]
    }

    fn clear_event(&mut self) {
        self.soc.borrow_mut().gpiote.events_in[self.index] = false;
    }

    fn disable(&mut self) {
        let mut soc = self.soc.borrow_mut();
        soc.gpiote.mode[self.index] = Mode::Disabled;
        soc.gpiote.events_in[self.index] = false;
    }
}
