//! Unified error types for the pulse-capture core.
//!
//! Every failure in this crate is a static misconfiguration detected once,
//! during bring-up.  There is no transient class: polling never fails, and
//! "no capture yet" is a normal outcome, not an error.
//! All variants are `Copy` so they can be handed to the fault sink and
//! logged without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A fixed hardware pool ran out.  Retrying cannot help.
    ResourceExhausted(Resource),
    /// A configuration value is out of range or inconsistent.
    Config(ConfigError),
    /// `initialize()` was called on a controller that is already armed.
    AlreadyInitialized,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceExhausted(r) => write!(f, "resource exhausted: {r}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::AlreadyInitialized => write!(f, "controller already initialized"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Fixed-size hardware pools that can be exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// PPI routing channel.
    RouterChannel,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RouterChannel => write!(f, "event router channel"),
        }
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Pin number is not on the GPIO port.
    PinOutOfRange(u8),
    /// Self-test on-duration must be at least one tick.
    ZeroOnDuration,
    /// Self-test off-duration must be at least one tick.
    ZeroOffDuration,
    /// `on + off` does not fit in the timer's counter width.
    PeriodOverflow,
    /// The poll loop needs a non-zero interval.
    ZeroPollInterval,
    /// The timer instance lacks a CC register the role needs.
    MissingCompareRegister(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinOutOfRange(pin) => write!(f, "pin {pin} out of range"),
            Self::ZeroOnDuration => write!(f, "self-test on-duration is zero"),
            Self::ZeroOffDuration => write!(f, "self-test off-duration is zero"),
            Self::PeriodOverflow => write!(f, "self-test period overflows the timer"),
            Self::ZeroPollInterval => write!(f, "poll interval is zero"),
            Self::MissingCompareRegister(n) => write!(f, "timer has no CC[{n}]"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
