//! Test bench around the simulated SoC, plus recording port adapters.
//!
//! The sinks record every call so tests can assert on the full report
//! history instead of scraping log output.

use pulsecap::app::events::Report;
use pulsecap::app::ports::{FaultSink, ReportSink};
use pulsecap::capture::CaptureController;
use pulsecap::config::CaptureConfig;
use pulsecap::drivers::router::{Channel, EventRouter};
use pulsecap::error::Error;
use pulsecap::hw::Level;
use pulsecap::pins;
use pulsecap::sim::{Peripherals, SimGpioteChannel, SimPpi, SimTimer, Soc, GPIOTE_CHANNELS, TIMER_COUNT};

// ── Recording sinks ───────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub reports: Vec<Report>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn captured_ticks(&self) -> Vec<u32> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                Report::Captured(w) => Some(w.ticks()),
                _ => None,
            })
            .collect()
    }

    pub fn misses(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r, Report::NoCapture))
            .count()
    }
}

impl ReportSink for RecordingSink {
    fn emit(&mut self, report: &Report) {
        self.reports.push(*report);
    }
}

#[derive(Default)]
pub struct RecordingFault {
    pub errors: Vec<Error>,
}

impl FaultSink for RecordingFault {
    fn fatal(&mut self, error: &Error) {
        self.errors.push(*error);
    }
}

// ── Bench ─────────────────────────────────────────────────────

pub type SimController = CaptureController<SimGpioteChannel, SimTimer>;

/// A fresh SoC with its peripherals laid out in claimable banks.
pub struct Bench {
    pub soc: Soc,
    pub router: EventRouter<SimPpi>,
    gpiote: [Option<SimGpioteChannel>; GPIOTE_CHANNELS],
    timers: [Option<SimTimer>; TIMER_COUNT],
}

#[allow(dead_code)]
impl Bench {
    pub fn new() -> Self {
        let soc = Soc::new();
        let Peripherals { ppi, gpiote, timers } = soc.take().expect("fresh SoC");
        Self {
            soc,
            router: EventRouter::new(ppi),
            gpiote: gpiote.map(Some),
            timers: timers.map(Some),
        }
    }

    pub fn channel(&mut self, index: usize) -> SimGpioteChannel {
        self.gpiote[index].take().expect("GPIOTE channel already claimed")
    }

    pub fn timer(&mut self, index: usize) -> SimTimer {
        self.timers[index].take().expect("timer already claimed")
    }

    /// Capture controller on the standard channels and timer, not yet
    /// initialized.
    pub fn controller(&mut self, config: &CaptureConfig) -> SimController {
        let falling = self.channel(pins::GPIOTE_CH_CAPTURE);
        let rising = self.channel(pins::GPIOTE_CH_RESTART);
        let timer = self.timer(pins::CAPTURE_TIMER);
        CaptureController::from_config(config, falling, rising, timer).expect("valid config")
    }

    /// Hold router channels so only `free` remain.
    pub fn leave_free(&mut self, free: u8) -> Vec<Channel> {
        let mut held = Vec::new();
        while self.router.free_channels() > free {
            held.push(self.router.allocate().expect("pool not yet empty"));
        }
        held
    }

    /// Drive a high pulse of `cycles` base-clock cycles on `pin`.
    pub fn pulse(&self, pin: u8, cycles: u64) {
        self.soc.drive_pin(pin, Level::High);
        self.soc.advance(cycles);
        self.soc.drive_pin(pin, Level::Low);
    }

    pub fn pulse_us(&self, pin: u8, micros: u64) {
        self.pulse(pin, micros * 16);
    }
}
