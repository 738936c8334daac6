//! Log-based report sink adapter.
//!
//! Implements [`ReportSink`] by writing each report through the `log`
//! facade (the console in the simulation binary).

use log::info;

use crate::app::events::Report;
use crate::app::ports::ReportSink;

/// Adapter that logs every [`Report`] to the console.
#[derive(Debug, Default)]
pub struct LogReportSink;

impl LogReportSink {
    pub fn new() -> Self {
        Self
    }
}

impl ReportSink for LogReportSink {
    fn emit(&mut self, report: &Report) {
        match report {
            Report::Started { self_test } => {
                info!("Pulse capture started (self-test {})", if *self_test { "on" } else { "off" });
            }
            Report::Captured(width) => {
                info!("Capture value: {}", width);
            }
            Report::NoCapture => {
                info!("No capture detected");
            }
        }
    }
}
