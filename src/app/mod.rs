//! Application core: bring-up sequencing and the poll loop.
//!
//! Everything here is generic over the hardware traits and talks to the
//! outside world only through the [`ports`], so it runs unchanged against
//! the simulated SoC and against test doubles.

pub mod events;
pub mod ports;
pub mod service;
