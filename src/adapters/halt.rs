//! Fatal-error adapter: log and give up.

use log::error;

use crate::app::ports::FaultSink;
use crate::error::Error;

/// Logs the bring-up error.  Records that it fired so the entry point
/// can stop instead of entering the poll loop.
#[derive(Debug, Default)]
pub struct HaltOnFault {
    halted: bool,
}

impl HaltOnFault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn halted(&self) -> bool {
        self.halted
    }
}

impl FaultSink for HaltOnFault {
    fn fatal(&mut self, err: &Error) {
        error!("FATAL | bring-up failed: {}", err);
        self.halted = true;
    }
}
