//! TIMER model.
//!
//! Counts base-clock cycles through the prescaler.  Rather than stepping
//! tick by tick, the SoC asks each running timer how many cycles remain
//! until its next compare match and jumps straight there.

use core::cell::RefCell;
use std::rc::Rc;

use log::warn;

use super::SocState;
use crate::hw::{BitWidth, EventAddr, TaskAddr, TimerEvent, TimerFrequency, TimerHw, TimerTask};

pub(super) const TIMER_BASES: [u32; 5] = [
    0x4000_8000,
    0x4000_9000,
    0x4000_A000,
    0x4001_A000,
    0x4001_B000,
];

/// CC registers per instance: TIMER0–2 have 4, TIMER3–4 have 6.
pub(super) const CC_COUNTS: [u8; 5] = [4, 4, 4, 6, 6];

pub(super) const MAX_CC: usize = 6;

const TASKS_START: u32 = 0x000;
const TASKS_STOP: u32 = 0x004;
const TASKS_CLEAR: u32 = 0x00C;
const TASKS_CAPTURE: u32 = 0x040;
const EVENTS_COMPARE: u32 = 0x140;

pub(super) fn task_address(index: usize, task: TimerTask) -> u32 {
    let offset = match task {
        TimerTask::Start => TASKS_START,
        TimerTask::Stop => TASKS_STOP,
        TimerTask::Clear => TASKS_CLEAR,
        TimerTask::Capture(n) => TASKS_CAPTURE + 4 * n as u32,
    };
    TIMER_BASES[index] + offset
}

pub(super) fn event_address(index: usize, event: TimerEvent) -> u32 {
    match event {
        TimerEvent::Compare(n) => TIMER_BASES[index] + EVENTS_COMPARE + 4 * n as u32,
    }
}

/// Decode a task address into `(instance, task)`.
pub(super) fn decode_task(addr: u32) -> Option<(usize, TimerTask)> {
    let index = TIMER_BASES.iter().position(|&base| addr & !0xFFF == base)?;
    let task = match addr & 0xFFF {
        TASKS_START => TimerTask::Start,
        TASKS_STOP => TimerTask::Stop,
        TASKS_CLEAR => TimerTask::Clear,
        off if (TASKS_CAPTURE..TASKS_CAPTURE + 4 * MAX_CC as u32).contains(&off) => {
            TimerTask::Capture(((off - TASKS_CAPTURE) / 4) as u8)
        }
        _ => return None,
    };
    Some((index, task))
}

/// Decode an event address into `(instance, cc index)`.
pub(super) fn decode_event(addr: u32) -> Option<(usize, usize)> {
    let index = TIMER_BASES.iter().position(|&base| addr & !0xFFF == base)?;
    let off = addr & 0xFFF;
    if (EVENTS_COMPARE..EVENTS_COMPARE + 4 * MAX_CC as u32).contains(&off) {
        Some((index, ((off - EVENTS_COMPARE) / 4) as usize))
    } else {
        None
    }
}

pub(super) struct TimerState {
    pub running: bool,
    pub frequency: TimerFrequency,
    pub width: BitWidth,
    pub count: u32,
    /// Base-clock cycles accumulated towards the next tick.
    pub phase: u32,
    pub cc: [u32; MAX_CC],
    pub cc_count: u8,
    /// Bit n set = COMPARE\[n\]→CLEAR short enabled.
    pub shorts_clear: u8,
    pub events_compare: [bool; MAX_CC],
}

impl TimerState {
    pub fn new(cc_count: u8) -> Self {
        Self {
            running: false,
            frequency: TimerFrequency::F16MHz,
            width: BitWidth::Bits16,
            count: 0,
            phase: 0,
            cc: [0; MAX_CC],
            cc_count,
            shorts_clear: 0,
            events_compare: [false; MAX_CC],
        }
    }

    fn modulus(&self) -> u64 {
        self.width.max_count() as u64 + 1
    }

    /// Ticks until the count next becomes CC\[n\]; a full wrap when it
    /// already is.  `None` when CC\[n\] is wider than the counter.
    fn ticks_to_match(&self, n: usize) -> Option<u64> {
        let target = self.cc[n] as u64;
        let modulus = self.modulus();
        if target >= modulus {
            return None;
        }
        let d = (target + modulus - self.count as u64) % modulus;
        Some(if d == 0 { modulus } else { d })
    }

    pub fn cycles_to_next_compare(&self) -> Option<u64> {
        if !self.running {
            return None;
        }
        let div = self.frequency.divider() as u64;
        (0..self.cc_count as usize)
            .filter_map(|n| self.ticks_to_match(n))
            .min()
            .map(|ticks| (ticks - 1) * div + (div - self.phase as u64))
    }

    /// Run for `cycles` base-clock cycles.  The caller never steps past
    /// the next compare match, so a match can only land on the last tick.
    /// Returns the bitmask of CC registers matched.
    pub fn advance(&mut self, cycles: u64) -> u8 {
        if !self.running {
            return 0;
        }
        let div = self.frequency.divider() as u64;
        let total = self.phase as u64 + cycles;
        let ticks = total / div;
        self.phase = (total % div) as u32;
        if ticks == 0 {
            return 0;
        }

        let mut hits = 0u8;
        for n in 0..self.cc_count as usize {
            if self.ticks_to_match(n) == Some(ticks) {
                hits |= 1 << n;
                self.events_compare[n] = true;
            }
        }

        self.count = ((self.count as u64 + ticks) % self.modulus()) as u32;
        if hits & self.shorts_clear != 0 {
            self.count = 0;
            self.phase = 0;
        }
        hits
    }

    pub fn execute(&mut self, task: TimerTask) {
        match task {
            TimerTask::Start => self.running = true,
            TimerTask::Stop => self.running = false,
            TimerTask::Clear => {
                self.count = 0;
                self.phase = 0;
            }
            TimerTask::Capture(n) if n < self.cc_count => self.cc[n as usize] = self.count,
            TimerTask::Capture(n) => warn!("sim: CAPTURE[{}] on a timer with {} CC", n, self.cc_count),
        }
    }
}

/// Handle to one TIMER instance.
pub struct SimTimer {
    pub(super) soc: Rc<RefCell<SocState>>,
    pub(super) index: usize,
}

impl SimTimer {
    /// Running count, read without a capture task.
    pub fn count(&self) -> u32 {
        self.soc.borrow().timers[self.index].count
    }

    pub fn is_running(&self) -> bool {
        self.soc.borrow().timers[self.index].running
    }
}

impl TimerHw for SimTimer {
    fn cc_count(&self) -> u8 {
        CC_COUNTS[self.index]
    }

    fn configure(&mut self, frequency: TimerFrequency, width: BitWidth) {
        let mut soc = self.soc.borrow_mut();
        let timer = &mut soc.timers[self.index];
        if timer.running {
            warn!("sim: TIMER{} reconfigured while running", self.index);
        }
        timer.frequency = frequency;
        timer.width = width;
    }

    fn set_compare(&mut self, channel: u8, value: u32, clear_on_match: bool) {
        let mut soc = self.soc.borrow_mut();
        let timer = &mut soc.timers[self.index];
        if channel >= timer.cc_count {
            warn!("sim: TIMER{} has no CC[{}]", self.index, channel);
            return;
        }
        timer.cc[channel as usize] = value;
        if clear_on_match {
            timer.shorts_clear |= 1 << channel;
        } else {
            timer.shorts_clear &= !(1 << channel);
        }
    }

    fn compare_value(&self, channel: u8) -> u32 {
        let soc = self.soc.borrow();
        let timer = &soc.timers[self.index];
        if channel < timer.cc_count {
            timer.cc[channel as usize]
        } else {
            0
        }
    }

    fn task_address(&self, task: TimerTask) -> TaskAddr {
        TaskAddr(task_address(self.index, task))
    }

    fn event_address(&self, event: TimerEvent) -> EventAddr {
        EventAddr(event_address(self.index, event))
    }

    fn trigger(&mut self, task: TimerTask) {
        let mut soc = self.soc.borrow_mut();
        soc.trigger_task(task_address(self.index, task));
    }
}
