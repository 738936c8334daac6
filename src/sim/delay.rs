//! `DelayNs` that moves simulated time.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

use super::Soc;

/// Advances the SoC clock by the requested delay.  A paced delay also
/// sleeps the host thread, so a demo run proceeds in wall-clock time.
pub struct SimDelay {
    soc: Soc,
    paced: bool,
}

impl SimDelay {
    pub fn new(soc: Soc) -> Self {
        Self { soc, paced: false }
    }

    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }
}

impl DelayNs for SimDelay {
    fn delay_ns(&mut self, ns: u32) {
        // 16 cycles per µs; sub-cycle remainders are dropped.
        self.soc.advance(ns as u64 * 16 / 1000);
        if self.paced {
            std::thread::sleep(Duration::from_nanos(ns as u64));
        }
    }
}
