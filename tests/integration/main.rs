//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises one subsystem against
//! the simulated SoC.  All tests run on the host with no real hardware.

#![cfg(feature = "sim")]

mod capture_tests;
mod mock_hw;
mod monitor_tests;
