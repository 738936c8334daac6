//! Outbound reports.
//!
//! The [`PulseMonitor`](super::service::PulseMonitor) emits these through
//! the [`ReportSink`](super::ports::ReportSink) port.

use crate::measurement::PulseWidth;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Bring-up finished; `self_test` tells whether the generator runs.
    Started { self_test: bool },

    /// A pulse was captured since the previous poll.
    Captured(PulseWidth),

    /// Nothing captured since the previous poll.
    NoCapture,
}
