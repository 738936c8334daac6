//! Measured pulse width.
//!
//! A width is stored as the raw tick count captured by hardware together
//! with the tick rate it was counted at.  Conversion to time happens on
//! read, from the configured [`TimerFrequency`], so the same count means
//! the same thing at every prescaler setting.

use core::fmt;
use core::time::Duration;

use crate::hw::TimerFrequency;

/// One captured pulse.  A zero-tick width is a real (if implausible)
/// measurement; "nothing captured" is expressed as `Option::None` by the
/// caller, never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWidth {
    ticks: u32,
    frequency: TimerFrequency,
}

impl PulseWidth {
    pub const fn new(ticks: u32, frequency: TimerFrequency) -> Self {
        Self { ticks, frequency }
    }

    /// Raw count from the capture register.
    pub const fn ticks(&self) -> u32 {
        self.ticks
    }

    pub const fn frequency(&self) -> TimerFrequency {
        self.frequency
    }

    /// Width in whole microseconds.
    pub const fn as_micros(&self) -> u64 {
        self.frequency.ticks_to_micros(self.ticks)
    }

    pub const fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.frequency.ticks_to_nanos(self.ticks))
    }

    /// Real-world duration of one tick: the measurement's resolution.
    pub const fn resolution(&self) -> Duration {
        Duration::from_nanos(self.frequency.ticks_to_nanos(1))
    }
}

impl fmt::Display for PulseWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} us", self.as_micros())
    }
}
