//! Peripheral drivers built on the [`crate::hw`] register traits.

pub mod capture_timer;
pub mod edge;
pub mod pin_output;
pub mod router;
