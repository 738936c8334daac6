//! Peripheral register boundary.
//!
//! The drivers in [`crate::drivers`] never touch silicon directly; they go
//! through the traits below, one per hardware block:
//!
//! ```text
//!   GPIOTE channel ──event──▶ PPI channel ──task──▶ TIMER
//!   (GpioteChannelHw)         (PpiHw)               (TimerHw)
//! ```
//!
//! Events and tasks are identified by their register address, exactly as
//! the PPI peripheral sees them.  Routing is therefore a pure
//! `(EventAddr, TaskAddr)` pair written into hardware; software is never
//! on the timing path.
//!
//! The only implementation shipped with the crate is the simulated SoC in
//! [`crate::sim`].

use serde::{Deserialize, Serialize};

/// Base clock feeding every TIMER prescaler.
pub const BASE_CLOCK_HZ: u32 = 16_000_000;

const BASE_CLOCK_MHZ: u64 = (BASE_CLOCK_HZ / 1_000_000) as u64;

/// Address of a hardware event register (an `EVENTS_*` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventAddr(pub u32);

/// Address of a hardware task register (a `TASKS_*` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskAddr(pub u32);

impl core::fmt::Display for EventAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl core::fmt::Display for TaskAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

// ───────────────────────────────────────────────────────────────
// Pin-level types
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Level {
    #[default]
    Low,
    High,
}

impl core::ops::Not for Level {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
        }
    }
}

/// Which transition a GPIOTE channel reacts to (event mode) or performs
/// on its `OUT` task (task mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Rising edge.
    LoToHi,
    /// Falling edge.
    HiToLo,
    /// Either edge.
    Toggle,
}

impl Polarity {
    /// Whether a `from → to` transition matches this polarity.
    pub fn matches(self, from: Level, to: Level) -> bool {
        match self {
            Self::LoToHi => from == Level::Low && to == Level::High,
            Self::HiToLo => from == Level::High && to == Level::Low,
            Self::Toggle => from != to,
        }
    }
}

/// Internal pull resistor on an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Pull {
    #[default]
    None,
    Down,
    Up,
}

/// Tasks a GPIOTE channel in task mode exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinTask {
    /// Drive according to the configured polarity.
    Out,
    /// Drive high.
    Set,
    /// Drive low.
    Clear,
}

// ───────────────────────────────────────────────────────────────
// Timer types
// ───────────────────────────────────────────────────────────────

/// Timer tick rate: `BASE_CLOCK_HZ / 2^prescaler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TimerFrequency {
    F16MHz = 0,
    F8MHz = 1,
    F4MHz = 2,
    F2MHz = 3,
    F1MHz = 4,
    F500kHz = 5,
    F250kHz = 6,
    F125kHz = 7,
    F62500Hz = 8,
    F31250Hz = 9,
}

impl TimerFrequency {
    pub const ALL: [Self; 10] = [
        Self::F16MHz,
        Self::F8MHz,
        Self::F4MHz,
        Self::F2MHz,
        Self::F1MHz,
        Self::F500kHz,
        Self::F250kHz,
        Self::F125kHz,
        Self::F62500Hz,
        Self::F31250Hz,
    ];

    /// Value written to the PRESCALER register.
    pub const fn prescaler(self) -> u8 {
        self as u8
    }

    /// Base-clock cycles per timer tick.
    pub const fn divider(self) -> u32 {
        1 << self.prescaler()
    }

    pub const fn hz(self) -> u32 {
        BASE_CLOCK_HZ >> self.prescaler()
    }

    /// Convert a tick count to nanoseconds, rounding down.
    pub const fn ticks_to_nanos(self, ticks: u32) -> u64 {
        ticks as u64 * self.divider() as u64 * 1_000 / BASE_CLOCK_MHZ
    }

    /// Convert a tick count to microseconds, rounding down.
    pub const fn ticks_to_micros(self, ticks: u32) -> u64 {
        ticks as u64 * self.divider() as u64 / BASE_CLOCK_MHZ
    }

    /// Number of whole ticks in `micros`, saturating at `u32::MAX`.
    pub fn micros_to_ticks(self, micros: u32) -> u32 {
        let ticks = micros as u64 * self.hz() as u64 / 1_000_000;
        u32::try_from(ticks).unwrap_or(u32::MAX)
    }
}

/// Counter width.  The count wraps at `2^bits`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitWidth {
    Bits8,
    Bits16,
    Bits24,
    Bits32,
}

impl BitWidth {
    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits8 => 8,
            Self::Bits16 => 16,
            Self::Bits24 => 24,
            Self::Bits32 => 32,
        }
    }

    /// Largest representable count.
    pub const fn max_count(self) -> u32 {
        match self {
            Self::Bits32 => u32::MAX,
            other => (1 << other.bits()) - 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTask {
    Start,
    Stop,
    Clear,
    /// Copy the running count into CC\[n\].
    Capture(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Count reached CC\[n\].
    Compare(u8),
}

// ───────────────────────────────────────────────────────────────
// Peripheral traits
// ───────────────────────────────────────────────────────────────

/// Programmable event router (PPI).
pub trait PpiHw {
    /// Size of the fixed channel pool.
    fn channel_count(&self) -> u8;

    /// Write the event-endpoint / task-endpoint pair of `channel`.
    fn assign(&mut self, channel: u8, event: EventAddr, task: TaskAddr);

    /// Set or clear the channel's bit in CHEN.
    fn set_enabled(&mut self, channel: u8, enabled: bool);

    fn is_enabled(&self, channel: u8) -> bool;
}

/// One GPIOTE channel.  Each channel is a distinct handle, so ownership of
/// a channel is ownership of its CONFIG, TASKS and EVENTS registers.
pub trait GpioteChannelHw {
    /// Hardware channel index.
    fn index(&self) -> u8;

    /// Event mode: latch `EVENTS_IN` on a `polarity` transition of `pin`.
    fn configure_event(&mut self, pin: u8, polarity: Polarity, pull: Pull);

    /// Task mode: drive `pin`, starting from `initial`.
    fn configure_task(&mut self, pin: u8, polarity: Polarity, initial: Level);

    fn event_address(&self) -> EventAddr;

    fn task_address(&self, task: PinTask) -> TaskAddr;

    /// Whether `EVENTS_IN` is latched.
    fn event_pending(&self) -> bool;

    /// Write 0 to `EVENTS_IN`.
    fn clear_event(&mut self);

    /// Back to disabled mode: the pin is released and nothing latches.
    fn disable(&mut self);
}

/// One TIMER instance.
pub trait TimerHw {
    /// Number of CC registers on this instance.
    fn cc_count(&self) -> u8;

    /// Program prescaler and bit width.  The timer must be stopped.
    fn configure(&mut self, frequency: TimerFrequency, width: BitWidth);

    /// Write CC\[channel\]; with `clear_on_match` the COMPARE→CLEAR short
    /// is enabled for that channel.
    fn set_compare(&mut self, channel: u8, value: u32, clear_on_match: bool);

    /// Read CC\[channel\].
    fn compare_value(&self, channel: u8) -> u32;

    fn task_address(&self, task: TimerTask) -> TaskAddr;

    fn event_address(&self, event: TimerEvent) -> EventAddr;

    /// Trigger a task from software.
    fn trigger(&mut self, task: TimerTask);
}
