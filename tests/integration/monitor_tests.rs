//! PulseMonitor: bring-up sequencing, the poll loop and its reports.

use pulsecap::app::events::Report;
use pulsecap::app::service::{CaptureParts, PulseMonitor, SelfTestParts};
use pulsecap::capture::CaptureState;
use pulsecap::config::CaptureConfig;
use pulsecap::error::{ConfigError, Error, Resource};
use pulsecap::hw::Level;
use pulsecap::pins::{self, SAMPLE_PIN};
use pulsecap::sim::{SimGpioteChannel, SimTimer};

use crate::mock_hw::{Bench, RecordingFault, RecordingSink};

type Monitor = PulseMonitor<SimGpioteChannel, SimTimer>;

fn bring_up(
    bench: &mut Bench,
    config: &CaptureConfig,
    sink: &mut RecordingSink,
    fault: &mut RecordingFault,
) -> pulsecap::error::Result<Monitor> {
    let capture = CaptureParts {
        falling: bench.channel(pins::GPIOTE_CH_CAPTURE),
        rising: bench.channel(pins::GPIOTE_CH_RESTART),
        timer: bench.timer(pins::CAPTURE_TIMER),
    };
    let self_test = SelfTestParts {
        output: bench.channel(pins::GPIOTE_CH_SELFTEST),
        timer: bench.timer(pins::SELFTEST_TIMER),
    };
    PulseMonitor::bring_up(config, &mut bench.router, capture, Some(self_test), sink, fault)
}

#[test]
fn default_bring_up_reports_the_self_test_pulse() {
    let config = CaptureConfig::default();
    let mut bench = Bench::new();
    bench.soc.loopback(config.self_test.pin, config.input_pin);
    let mut sink = RecordingSink::new();
    let mut fault = RecordingFault::default();

    let mut monitor = bring_up(&mut bench, &config, &mut sink, &mut fault).unwrap();
    assert!(fault.errors.is_empty());
    assert_eq!(sink.reports, vec![Report::Started { self_test: true }]);
    assert!(monitor.self_test().is_some());
    assert_eq!(bench.soc.routes_enabled(), 4);

    let mut delay = bench.soc.delay();
    monitor.run(&mut sink, &mut delay, Some(5));

    // Poll comes before the first delay, so the first cycle sees nothing.
    assert_eq!(sink.reports.len(), 6);
    assert_eq!(sink.reports[1], Report::NoCapture);
    assert_eq!(sink.captured_ticks(), vec![678; 4]);

    let stats = monitor.stats();
    assert_eq!((stats.polls, stats.captures, stats.misses), (5, 4, 1));
    assert_eq!(stats.last_width.map(|w| w.as_micros()), Some(678));
    assert_eq!(bench.soc.now_cycles(), 5 * 500 * 16_000);
}

#[test]
fn disabled_self_test_leaves_its_parts_idle() {
    let mut config = CaptureConfig::default();
    config.self_test.enabled = false;
    let mut bench = Bench::new();
    let mut sink = RecordingSink::new();
    let mut fault = RecordingFault::default();

    let mut monitor = bring_up(&mut bench, &config, &mut sink, &mut fault).unwrap();
    assert_eq!(sink.reports, vec![Report::Started { self_test: false }]);
    assert!(monitor.self_test().is_none());
    assert_eq!(bench.soc.routes_enabled(), 2);

    let mut delay = bench.soc.delay();
    monitor.run(&mut sink, &mut delay, Some(3));
    assert_eq!(sink.misses(), 3);
    assert_eq!(monitor.stats().last_width, None);
}

#[test]
fn external_pulse_is_reported_once() {
    let mut config = CaptureConfig::default();
    config.self_test.enabled = false;
    let mut bench = Bench::new();
    let mut sink = RecordingSink::new();
    let mut fault = RecordingFault::default();
    let mut monitor = bring_up(&mut bench, &config, &mut sink, &mut fault).unwrap();

    bench.pulse_us(SAMPLE_PIN, 1_234);
    assert_eq!(monitor.capture_state(), CaptureState::CaptureAvailable);

    assert_eq!(monitor.poll_cycle(&mut sink).map(|w| w.ticks()), Some(1_234));
    assert_eq!(monitor.poll_cycle(&mut sink), None);
    assert_eq!(sink.captured_ticks(), vec![1_234]);
    assert_eq!(sink.misses(), 1);
}

#[test]
fn invalid_config_goes_to_the_fault_sink() {
    let config = CaptureConfig {
        poll_interval_ms: 0,
        ..CaptureConfig::default()
    };
    let mut bench = Bench::new();
    let mut sink = RecordingSink::new();
    let mut fault = RecordingFault::default();

    let err = bring_up(&mut bench, &config, &mut sink, &mut fault).err();
    let expected = Error::Config(ConfigError::ZeroPollInterval);
    assert_eq!(err, Some(expected));
    assert_eq!(fault.errors, vec![expected]);
    assert!(sink.reports.is_empty(), "no Started report on failure");
    assert_eq!(bench.soc.routes_assigned(), 0);
}

#[test]
fn router_exhaustion_during_self_test_is_fatal() {
    let config = CaptureConfig::default();
    let mut bench = Bench::new();
    // Enough for the capture routes, not for the generator's.
    let _held = bench.leave_free(3);
    let mut sink = RecordingSink::new();
    let mut fault = RecordingFault::default();

    let err = bring_up(&mut bench, &config, &mut sink, &mut fault).err();
    let expected = Error::ResourceExhausted(Resource::RouterChannel);
    assert_eq!(err, Some(expected));
    assert_eq!(fault.errors, vec![expected]);
    assert!(sink.reports.is_empty(), "no Started report on failure");

    // The capture path was armed first and is taken down again.
    assert_eq!(bench.soc.routes_enabled(), 0);
    assert_eq!(bench.soc.routes_assigned(), 0);
    assert_eq!(bench.router.free_channels(), 3, "every channel bring-up took is back");

    // Neither path is left running: the generator pin stays idle.
    bench.soc.advance_us(2_000);
    assert_eq!(bench.soc.pin_level(config.self_test.pin), Level::Low);
}
