//! Pulse capture: host entry point.
//!
//! Runs the capture pipeline against the simulated SoC, with the
//! self-test generator looped back onto the capture input.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Adapters (outer ring)                   │
//! │   LogReportSink (ReportSink)    HaltOnFault (FaultSink)  │
//! │                                                          │
//! │  ──────────────── Port Trait Boundary ─────────────────  │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │            PulseMonitor (poll loop)                │  │
//! │  │  CaptureController · SelfTestGenerator             │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │                                                          │
//! │  EventRouter · EdgeDetector · CaptureTimer (drivers)     │
//! │  sim::Soc: PPI · GPIOTE · TIMER0–4                       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `RUST_LOG` overrides the default `info` filter.  `PULSECAP_CYCLES`
//! bounds the number of poll cycles; unset runs forever.

use anyhow::{Context, Result, bail};
use log::info;

use pulsecap::adapters::halt::HaltOnFault;
use pulsecap::adapters::log_sink::LogReportSink;
use pulsecap::app::service::{CaptureParts, PulseMonitor, SelfTestParts};
use pulsecap::config::CaptureConfig;
use pulsecap::drivers::router::EventRouter;
use pulsecap::pins;
use pulsecap::sim::{Peripherals, Soc};

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("Pulse capture v{} started", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = CaptureConfig::default();
    config.validate().context("invalid capture configuration")?;

    let cycles = match std::env::var("PULSECAP_CYCLES") {
        Ok(v) => Some(v.parse::<u64>().context("PULSECAP_CYCLES must be a cycle count")?),
        Err(_) => None,
    };

    // ── 3. Hardware ───────────────────────────────────────────
    let soc = Soc::new();
    let Some(Peripherals { ppi, gpiote, timers }) = soc.take() else {
        bail!("peripherals already taken");
    };

    if config.self_test.enabled && !config.self_test.drives_input(config.input_pin) {
        soc.loopback(config.self_test.pin, config.input_pin);
        info!(
            "Self-test pin {} looped back to input pin {}",
            config.self_test.pin, config.input_pin
        );
    }

    let mut gpiote = gpiote.map(Some);
    let mut timers = timers.map(Some);
    let falling = claim(&mut gpiote, pins::GPIOTE_CH_CAPTURE, "GPIOTE capture channel")?;
    let rising = claim(&mut gpiote, pins::GPIOTE_CH_RESTART, "GPIOTE restart channel")?;
    let output = claim(&mut gpiote, pins::GPIOTE_CH_SELFTEST, "GPIOTE self-test channel")?;
    let capture_timer = claim(&mut timers, pins::CAPTURE_TIMER, "capture timer")?;
    let self_test_timer = claim(&mut timers, pins::SELFTEST_TIMER, "self-test timer")?;

    // ── 4. Bring-up ───────────────────────────────────────────
    let mut router = EventRouter::new(ppi);
    let mut sink = LogReportSink::new();
    let mut fault = HaltOnFault::new();

    let mut monitor = PulseMonitor::bring_up(
        &config,
        &mut router,
        CaptureParts {
            falling,
            rising,
            timer: capture_timer,
        },
        Some(SelfTestParts {
            output,
            timer: self_test_timer,
        }),
        &mut sink,
        &mut fault,
    )
    .context("bring-up failed")?;

    // ── 5. Poll loop ──────────────────────────────────────────
    let mut delay = soc.delay().paced();
    monitor.run(&mut sink, &mut delay, cycles);

    let stats = monitor.stats();
    info!(
        "Stopped: {} polls, {} captures, {} misses",
        stats.polls, stats.captures, stats.misses
    );
    Ok(())
}

/// Move one peripheral out of its bank.
fn claim<P, const N: usize>(bank: &mut [Option<P>; N], index: usize, what: &str) -> Result<P> {
    bank.get_mut(index)
        .and_then(Option::take)
        .with_context(|| format!("{what} (index {index}) unavailable"))
}
