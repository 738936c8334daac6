//! Free-running capture timer.
//!
//! Exposes the two hardware tasks the capture pipeline routes to
//! (capture into CC0, clear) by address, plus a software read of CC0.
//! Whether the value in CC0 is fresh is not this driver's concern; the
//! edge detector's latched event says so.

use log::debug;

use crate::hw::{BitWidth, TaskAddr, TimerFrequency, TimerHw, TimerTask};

/// CC register that receives captures.
pub const CAPTURE_CC: u8 = 0;

pub struct CaptureTimer<T: TimerHw> {
    hw: T,
    frequency: TimerFrequency,
}

impl<T: TimerHw> CaptureTimer<T> {
    pub fn new(hw: T, frequency: TimerFrequency) -> Self {
        Self { hw, frequency }
    }

    /// Program the prescaler and width without starting.
    pub fn configure(&mut self, width: BitWidth) {
        self.hw.configure(self.frequency, width);
    }

    /// Count from zero at the configured rate.  Called once, at bring-up.
    pub fn start(&mut self) {
        self.hw.trigger(TimerTask::Clear);
        self.hw.trigger(TimerTask::Start);
        debug!("capture timer: running at {} Hz", self.frequency.hz());
    }

    pub fn stop(&mut self) {
        self.hw.trigger(TimerTask::Stop);
        debug!("capture timer: stopped");
    }

    pub fn capture_task_address(&self) -> TaskAddr {
        self.hw.task_address(TimerTask::Capture(CAPTURE_CC))
    }

    pub fn clear_task_address(&self) -> TaskAddr {
        self.hw.task_address(TimerTask::Clear)
    }

    /// Last value written to CC0 by a capture task, stale or not.
    pub fn read_capture_register(&self) -> u32 {
        self.hw.compare_value(CAPTURE_CC)
    }

    pub fn frequency(&self) -> TimerFrequency {
        self.frequency
    }
}
