//! GPIO pin assignments for the nRF52 DK.
//!
//! Single source of truth: the default configuration and the simulator
//! both reference this module rather than hard-coding pin numbers.

/// Pins on GPIO port P0.
pub const PIN_COUNT: u8 = 32;

/// Capture input.  External pulses (or the self-test loopback) land here.
pub const SAMPLE_PIN: u8 = 3;

/// LED_1 on the DK.  Default self-test output; jumper it to [`SAMPLE_PIN`]
/// on real hardware.
pub const LED_1: u8 = 17;

// ---------------------------------------------------------------------------
// GPIOTE channel roles
// ---------------------------------------------------------------------------

/// Falling edge on the sample pin: capture.
pub const GPIOTE_CH_CAPTURE: usize = 0;
/// Rising edge on the sample pin: restart the counter.
pub const GPIOTE_CH_RESTART: usize = 1;
/// Task-mode channel driving the self-test pin.
pub const GPIOTE_CH_SELFTEST: usize = 2;

// ---------------------------------------------------------------------------
// TIMER instance roles
// ---------------------------------------------------------------------------

/// TIMER3: capture timer.
pub const CAPTURE_TIMER: usize = 3;
/// TIMER4: self-test pulse generator.
pub const SELFTEST_TIMER: usize = 4;

/// Whether `pin` exists on port P0.
pub const fn is_valid(pin: u8) -> bool {
    pin < PIN_COUNT
}
