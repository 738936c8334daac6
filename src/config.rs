//! System configuration parameters
//!
//! Everything the capture pipeline and the self-test generator can be
//! tuned with.  Defaults reproduce the reference bench setup: capture on
//! P0.03 at 1 MHz, self-test on LED_1 with a 678 µs / 10 µs pulse.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::hw::{BitWidth, Pull, TimerFrequency};
use crate::pins;
use crate::selftest;

/// Capture pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptureConfig {
    // --- Input ---
    /// Pin the pulse arrives on
    pub input_pin: u8,
    /// Internal pull on the input pin
    pub input_pull: Pull,

    // --- Capture timer ---
    /// Tick rate of the capture timer
    pub frequency: TimerFrequency,
    /// Counter width of the capture timer
    pub bit_width: BitWidth,

    // --- Timing ---
    /// Delay between polls (milliseconds)
    pub poll_interval_ms: u32,

    // --- Self-test ---
    pub self_test: SelfTestConfig,
}

/// Self-test pulse generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfTestConfig {
    /// Run the generator at bring-up
    pub enabled: bool,
    /// Output pin; equal to `input_pin` or looped back to it externally
    pub pin: u8,
    /// Tick rate of the generator timer
    pub frequency: TimerFrequency,
    /// High time per period (ticks)
    pub on_ticks: u32,
    /// Low time per period (ticks)
    pub off_ticks: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            // Input
            input_pin: pins::SAMPLE_PIN,
            input_pull: Pull::None,

            // Capture timer
            frequency: TimerFrequency::F1MHz,
            bit_width: BitWidth::Bits32,

            // Timing
            poll_interval_ms: 500,

            self_test: SelfTestConfig::default(),
        }
    }
}

impl Default for SelfTestConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pin: pins::LED_1,
            frequency: TimerFrequency::F1MHz,
            on_ticks: 678,
            off_ticks: 10,
        }
    }
}

impl CaptureConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !pins::is_valid(self.input_pin) {
            return Err(ConfigError::PinOutOfRange(self.input_pin));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.self_test.enabled {
            self.self_test.validate()?;
        }
        Ok(())
    }
}

impl SelfTestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !pins::is_valid(self.pin) {
            return Err(ConfigError::PinOutOfRange(self.pin));
        }
        selftest::validate_durations(self.on_ticks, self.off_ticks, BitWidth::Bits32)?;
        Ok(())
    }

    /// Whether the generator output is the capture input itself.
    pub fn drives_input(&self, input_pin: u8) -> bool {
        self.pin == input_pin
    }
}
