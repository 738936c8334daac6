//! Hardware pulse-width capture.
//!
//! Measures the high time of a digital pulse entirely in hardware: an edge
//! detector raises events, the event router turns them into timer tasks,
//! and the timer's capture register holds the result until software polls
//! it.  An optional self-test generator produces a known pulse on a
//! second timer to close the loop.
//!
//! Drivers are generic over the register traits in [`hw`].  With the
//! `sim` feature (default) the crate also ships a cycle-accurate model of
//! the nRF52 event fabric implementing those traits.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod capture;
pub mod config;
pub mod drivers;
pub mod error;
pub mod hw;
pub mod measurement;
pub mod pins;
pub mod selftest;

#[cfg(feature = "sim")]
pub mod sim;
