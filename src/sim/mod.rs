//! Cycle-accurate model of the nRF52 event fabric.
//!
//! Models exactly what the capture pipeline touches: the PPI router, the
//! eight GPIOTE channels, the five TIMER instances and 32 pin levels.
//! Registers live at their real addresses, so the router connects the
//! same `EVENTS_*` and `TASKS_*` values the silicon would use.
//!
//! Time only moves when [`Soc::advance`] (or a [`SimDelay`]) is called.
//! Between compare matches nothing can happen, so the clock jumps from
//! one match to the next instead of ticking.  Every signal raised by a
//! match, a pin change or a task is propagated to quiescence before the
//! clock moves on:
//!
//! ```text
//!   pin change ─▶ GPIOTE event ─▶ latch + PPI ─▶ task ─▶ pin change ─▶ …
//!   compare    ─▶ TIMER event  ─▶ latch + PPI ─▶ task ─▶ …
//! ```
//!
//! [`Soc`] is a cheap handle; peripheral handles and delays share one
//! state.  Single-threaded by construction (`Rc<RefCell<_>>`).

mod delay;
mod gpiote;
mod ppi;
mod timer;

use core::cell::RefCell;
use std::rc::Rc;

use heapless::{Deque, Vec};
use log::{trace, warn};

pub use delay::SimDelay;
pub use gpiote::{GPIOTE_CHANNELS, SimGpioteChannel};
pub use ppi::{PPI_CHANNELS, SimPpi};
pub use timer::SimTimer;

use crate::hw::{BASE_CLOCK_HZ, Level, Pull, TimerEvent};
use crate::pins::{self, PIN_COUNT};

pub const TIMER_COUNT: usize = 5;

const QUEUE_DEPTH: usize = 64;
const MAX_LOOPBACKS: usize = 8;
/// Signals dispatched per settle before a routing loop is assumed.
const SETTLE_BUDGET: usize = 4096;

/// Everything that can travel through the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Event(u32),
    Task(u32),
    Pin(u8, Level),
}

#[derive(Debug, Clone, Copy, Default)]
struct PinState {
    level: Level,
    /// Set once anything drives the pin; pulls stop applying after that.
    driven: bool,
}

struct SocState {
    cycles: u64,
    taken: bool,
    pins: [PinState; PIN_COUNT as usize],
    loopbacks: Vec<(u8, u8), MAX_LOOPBACKS>,
    ppi: ppi::PpiState,
    gpiote: gpiote::GpioteState,
    timers: [timer::TimerState; TIMER_COUNT],
    queue: Deque<Signal, QUEUE_DEPTH>,
}

impl SocState {
    fn new() -> Self {
        Self {
            cycles: 0,
            taken: false,
            pins: [PinState::default(); PIN_COUNT as usize],
            loopbacks: Vec::new(),
            ppi: ppi::PpiState::default(),
            gpiote: gpiote::GpioteState::default(),
            timers: timer::CC_COUNTS.map(timer::TimerState::new),
            queue: Deque::new(),
        }
    }

    fn raise(&mut self, signal: Signal) {
        if self.queue.push_back(signal).is_err() {
            warn!("sim: signal queue full, dropped {:?}", signal);
        }
    }

    /// Dispatch queued signals until none are left.
    fn settle(&mut self) {
        let mut budget = SETTLE_BUDGET;
        while let Some(signal) = self.queue.pop_front() {
            if budget == 0 {
                warn!("sim: routing loop at cycle {}, dropping {} signals", self.cycles, self.queue.len() + 1);
                self.queue.clear();
                return;
            }
            budget -= 1;
            self.dispatch(signal);
        }
    }

    fn dispatch(&mut self, signal: Signal) {
        trace!("sim: @{} {:?}", self.cycles, signal);
        match signal {
            Signal::Event(addr) => {
                self.latch(addr);
                // Deque capacity bounds the fan-out; collect before raising.
                let tasks: Vec<u32, PPI_CHANNELS> = self.ppi.tasks_for(addr).collect();
                for task in tasks {
                    self.raise(Signal::Task(task));
                }
            }
            Signal::Task(addr) => self.execute(addr),
            Signal::Pin(pin, level) => self.set_pin(pin, level),
        }
    }

    fn latch(&mut self, addr: u32) {
        if let Some(ch) = gpiote::decode_event(addr) {
            self.gpiote.events_in[ch] = true;
        } else if let Some((idx, n)) = timer::decode_event(addr) {
            self.timers[idx].events_compare[n] = true;
        } else {
            warn!("sim: event at unmapped address {:#010x}", addr);
        }
    }

    fn execute(&mut self, addr: u32) {
        if let Some((ch, task)) = gpiote::decode_task(addr) {
            let pins = &self.pins;
            let output = self
                .gpiote
                .task_output(ch, task, |p| pins[p as usize].level);
            if let Some((pin, level)) = output {
                self.raise(Signal::Pin(pin, level));
            }
        } else if let Some((idx, task)) = timer::decode_task(addr) {
            self.timers[idx].execute(task);
        } else {
            warn!("sim: task at unmapped address {:#010x}", addr);
        }
    }

    fn set_pin(&mut self, pin: u8, level: Level) {
        let Some(state) = self.pins.get_mut(pin as usize) else {
            warn!("sim: pin {} out of range", pin);
            return;
        };
        state.driven = true;
        let from = state.level;
        if from == level {
            return;
        }
        state.level = level;

        let events: Vec<usize, GPIOTE_CHANNELS> = self.gpiote.matching_events(pin, from, level).collect();
        for ch in events {
            self.raise(Signal::Event(gpiote::event_address(ch)));
        }
        for i in 0..self.loopbacks.len() {
            let (src, dst) = self.loopbacks[i];
            if src == pin {
                self.raise(Signal::Pin(dst, level));
            }
        }
    }

    /// An undriven input settles to its pull level.  No edge is reported.
    fn apply_pull(&mut self, pin: u8, pull: Pull) {
        let Some(state) = self.pins.get_mut(pin as usize) else {
            return;
        };
        if state.driven {
            return;
        }
        match pull {
            Pull::Up => state.level = Level::High,
            Pull::Down => state.level = Level::Low,
            Pull::None => {}
        }
    }

    fn trigger_task(&mut self, addr: u32) {
        self.raise(Signal::Task(addr));
        self.settle();
    }

    fn advance(&mut self, mut cycles: u64) {
        while cycles > 0 {
            let step = self
                .timers
                .iter()
                .filter_map(timer::TimerState::cycles_to_next_compare)
                .min()
                .map_or(cycles, |next| next.min(cycles));
            self.cycles += step;
            cycles -= step;

            for idx in 0..TIMER_COUNT {
                let hits = self.timers[idx].advance(step);
                for n in 0..timer::MAX_CC {
                    if hits & (1 << n) != 0 {
                        let addr = timer::event_address(idx, TimerEvent::Compare(n as u8));
                        self.raise(Signal::Event(addr));
                    }
                }
            }
            self.settle();
        }
    }
}

/// The peripherals a [`Soc`] hands out, once.
pub struct Peripherals {
    pub ppi: SimPpi,
    pub gpiote: [SimGpioteChannel; GPIOTE_CHANNELS],
    pub timers: [SimTimer; TIMER_COUNT],
}

/// Handle to a simulated SoC.  Clones share the same state.
#[derive(Clone)]
pub struct Soc {
    state: Rc<RefCell<SocState>>,
}

impl Default for Soc {
    fn default() -> Self {
        Self::new()
    }
}

impl Soc {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(SocState::new())),
        }
    }

    /// Peripheral handles.  `None` after the first call, so each
    /// peripheral has exactly one owner.
    pub fn take(&self) -> Option<Peripherals> {
        let mut state = self.state.borrow_mut();
        if state.taken {
            return None;
        }
        state.taken = true;
        drop(state);

        let shared = &self.state;
        Some(Peripherals {
            ppi: SimPpi { soc: Rc::clone(shared) },
            gpiote: core::array::from_fn(|index| SimGpioteChannel {
                soc: Rc::clone(shared),
                index,
            }),
            timers: core::array::from_fn(|index| SimTimer {
                soc: Rc::clone(shared),
                index,
            }),
        })
    }

    /// Drive a pin from outside the chip, as a signal source would.
    pub fn drive_pin(&self, pin: u8, level: Level) {
        let mut state = self.state.borrow_mut();
        state.raise(Signal::Pin(pin, level));
        state.settle();
    }

    /// Wire `from` to `to` externally: every level change on `from` is
    /// applied to `to`.
    pub fn loopback(&self, from: u8, to: u8) {
        if !pins::is_valid(from) || !pins::is_valid(to) || from == to {
            warn!("sim: ignoring loopback {} -> {}", from, to);
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.loopbacks.push((from, to)).is_err() {
            warn!("sim: loopback table full");
            return;
        }
        let level = state.pins[from as usize].level;
        state.raise(Signal::Pin(to, level));
        state.settle();
    }

    pub fn advance(&self, cycles: u64) {
        self.state.borrow_mut().advance(cycles);
    }

    pub fn advance_us(&self, micros: u64) {
        self.advance(micros * (BASE_CLOCK_HZ as u64 / 1_000_000));
    }

    /// Base-clock cycles since power-on.
    pub fn now_cycles(&self) -> u64 {
        self.state.borrow().cycles
    }

    pub fn pin_level(&self, pin: u8) -> Level {
        self.state
            .borrow()
            .pins
            .get(pin as usize)
            .map_or(Level::Low, |p| p.level)
    }

    /// Router channels currently enabled.
    pub fn routes_enabled(&self) -> u8 {
        self.state.borrow().ppi.chen.count_ones() as u8
    }

    /// Router channels with an event or task endpoint written.
    pub fn routes_assigned(&self) -> u8 {
        self.state.borrow().ppi.assigned()
    }

    /// A delay that advances this SoC's clock.
    pub fn delay(&self) -> SimDelay {
        SimDelay::new(self.clone())
    }
}
