//! Port traits: the boundary between the measurement core and whatever
//! consumes its output.
//!
//! ```text
//!   PulseMonitor ──▶ ReportSink   (one report per poll cycle)
//!                └─▶ FaultSink    (fatal bring-up errors)
//! ```
//!
//! Hardware is not behind a port here; the drivers are generic over the
//! register traits in [`crate::hw`] instead.

use crate::error::Error;

use super::events::Report;

// ───────────────────────────────────────────────────────────────
// Report sink (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// Receives every [`Report`] the monitor produces.  Adapters decide where
/// reports go (serial log, test recorder, etc.).
pub trait ReportSink {
    fn emit(&mut self, report: &Report);
}

// ───────────────────────────────────────────────────────────────
// Fault sink (driven adapter: domain → fatal error handling)
// ───────────────────────────────────────────────────────────────

/// Handed the error when bring-up fails.  There is no recovery path; the
/// caller stops after this returns.
pub trait FaultSink {
    fn fatal(&mut self, error: &Error);
}
