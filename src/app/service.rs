//! Pulse monitor: the application core.
//!
//! [`PulseMonitor`] owns the capture controller and, optionally, the
//! self-test generator.  It brings both up in order, then polls the
//! controller at a fixed interval and reports each result.
//!
//! ```text
//!                 ┌─────────────────────────┐ ──▶ ReportSink
//!  EventRouter ──▶│      PulseMonitor       │
//!                 │  Capture · Self-test    │ ──▶ FaultSink (bring-up only)
//!                 └─────────────────────────┘
//! ```

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::capture::{CaptureController, CaptureState};
use crate::config::CaptureConfig;
use crate::drivers::router::EventRouter;
use crate::error::Result;
use crate::hw::{GpioteChannelHw, PpiHw, TimerHw};
use crate::measurement::PulseWidth;
use crate::selftest::SelfTestGenerator;

use super::events::Report;
use super::ports::{FaultSink, ReportSink};

/// The peripherals the capture path takes ownership of.
pub struct CaptureParts<E, T> {
    pub falling: E,
    pub rising: E,
    pub timer: T,
}

/// The peripherals the self-test generator takes ownership of.
pub struct SelfTestParts<E, T> {
    pub output: E,
    pub timer: T,
}

/// Running totals since bring-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub polls: u64,
    pub captures: u64,
    pub misses: u64,
    pub last_width: Option<PulseWidth>,
}

// ───────────────────────────────────────────────────────────────
// PulseMonitor
// ───────────────────────────────────────────────────────────────

pub struct PulseMonitor<E: GpioteChannelHw, T: TimerHw> {
    capture: CaptureController<E, T>,
    self_test: Option<SelfTestGenerator<E, T>>,
    poll_interval_ms: u32,
    stats: MonitorStats,
}

impl<E: GpioteChannelHw, T: TimerHw> PulseMonitor<E, T> {
    // ── Lifecycle ─────────────────────────────────────────────

    /// Validate the configuration, arm the capture path, then start the
    /// self-test generator when it is enabled and given its parts.
    ///
    /// Any failure is handed to `fault` before being returned, and leaves
    /// no route enabled or assigned: if the generator fails to start, the
    /// already-armed capture path is shut down first.  The capture routes
    /// are live by the time the generator starts, so its first pulse is
    /// already measured.
    pub fn bring_up<R: PpiHw>(
        config: &CaptureConfig,
        router: &mut EventRouter<R>,
        capture: CaptureParts<E, T>,
        self_test: Option<SelfTestParts<E, T>>,
        sink: &mut impl ReportSink,
        fault: &mut impl FaultSink,
    ) -> Result<Self> {
        Self::try_bring_up(config, router, capture, self_test, sink).inspect_err(|e| fault.fatal(e))
    }

    fn try_bring_up<R: PpiHw>(
        config: &CaptureConfig,
        router: &mut EventRouter<R>,
        capture: CaptureParts<E, T>,
        self_test: Option<SelfTestParts<E, T>>,
        sink: &mut impl ReportSink,
    ) -> Result<Self> {
        config.validate()?;

        let mut controller =
            CaptureController::from_config(config, capture.falling, capture.rising, capture.timer)?;
        controller.initialize(router)?;

        let generator = match self_test {
            Some(parts) if config.self_test.enabled => {
                match SelfTestGenerator::start(router, parts.output, parts.timer, &config.self_test) {
                    Ok(generator) => Some(generator),
                    Err(e) => {
                        controller.shutdown(router);
                        return Err(e);
                    }
                }
            }
            _ => None,
        };

        let self_test = generator.is_some();
        sink.emit(&Report::Started { self_test });
        info!(
            "monitor: up, polling every {} ms (self-test {})",
            config.poll_interval_ms,
            if self_test { "on" } else { "off" }
        );

        Ok(Self {
            capture: controller,
            self_test: generator,
            poll_interval_ms: config.poll_interval_ms,
            stats: MonitorStats::default(),
        })
    }

    // ── Per-cycle work ────────────────────────────────────────

    /// Poll once and emit exactly one report.
    pub fn poll_cycle(&mut self, sink: &mut impl ReportSink) -> Option<PulseWidth> {
        self.stats.polls += 1;
        let width = self.capture.poll();
        match width {
            Some(w) => {
                self.stats.captures += 1;
                self.stats.last_width = Some(w);
                sink.emit(&Report::Captured(w));
            }
            None => {
                self.stats.misses += 1;
                sink.emit(&Report::NoCapture);
            }
        }
        width
    }

    /// Poll, then wait one interval, `cycles` times; forever when `None`.
    pub fn run(&mut self, sink: &mut impl ReportSink, delay: &mut impl DelayNs, cycles: Option<u64>) {
        let mut done = 0u64;
        while cycles.is_none_or(|n| done < n) {
            self.poll_cycle(sink);
            delay.delay_ms(self.poll_interval_ms);
            done += 1;
        }
        debug!("monitor: stopped after {} cycles", done);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    pub fn capture_state(&self) -> CaptureState {
        self.capture.state()
    }

    pub fn self_test(&self) -> Option<&SelfTestGenerator<E, T>> {
        self.self_test.as_ref()
    }

    pub fn poll_interval_ms(&self) -> u32 {
        self.poll_interval_ms
    }
}
