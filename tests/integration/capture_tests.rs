//! Capture controller against the simulated event fabric.

use pulsecap::capture::CaptureState;
use pulsecap::config::CaptureConfig;
use pulsecap::error::{Error, Resource};
use pulsecap::hw::{Level, TimerFrequency};
use pulsecap::pins::SAMPLE_PIN;

use crate::mock_hw::{Bench, SimController};

fn armed(frequency: TimerFrequency) -> (Bench, SimController) {
    let config = CaptureConfig {
        frequency,
        ..CaptureConfig::default()
    };
    let mut bench = Bench::new();
    let mut ctrl = bench.controller(&config);
    ctrl.initialize(&mut bench.router).expect("initialize");
    (bench, ctrl)
}

#[test]
fn measures_high_time_at_one_mhz() {
    let (bench, mut ctrl) = armed(TimerFrequency::F1MHz);
    bench.soc.advance_us(37); // arbitrary idle before the pulse

    bench.pulse_us(SAMPLE_PIN, 678);

    let width = ctrl.poll().expect("falling edge captured");
    assert_eq!(width.ticks(), 678);
    assert_eq!(width.as_micros(), 678);
}

#[test]
fn no_capture_before_the_falling_edge() {
    let (bench, mut ctrl) = armed(TimerFrequency::F1MHz);
    assert_eq!(ctrl.poll(), None, "nothing happened yet");

    bench.soc.drive_pin(SAMPLE_PIN, Level::High);
    bench.soc.advance_us(100);
    assert_eq!(ctrl.poll(), None, "rising edge alone does not capture");
    assert_eq!(ctrl.state(), CaptureState::Armed);

    bench.soc.drive_pin(SAMPLE_PIN, Level::Low);
    assert_eq!(ctrl.poll().map(|w| w.ticks()), Some(100));
}

#[test]
fn poll_consumes_the_capture_once() {
    let (bench, mut ctrl) = armed(TimerFrequency::F1MHz);
    bench.pulse_us(SAMPLE_PIN, 250);

    assert!(ctrl.poll().is_some());
    assert_eq!(ctrl.poll(), None, "second poll with no new edge");
}

#[test]
fn last_value_wins() {
    let (bench, mut ctrl) = armed(TimerFrequency::F1MHz);
    bench.pulse_us(SAMPLE_PIN, 100);
    bench.soc.advance_us(50);
    bench.pulse_us(SAMPLE_PIN, 300);

    assert_eq!(ctrl.poll().map(|w| w.ticks()), Some(300));
    assert_eq!(ctrl.poll(), None, "no queue of older captures");
}

#[test]
fn state_follows_the_latched_edge() {
    let config = CaptureConfig::default();
    let mut bench = Bench::new();
    let mut ctrl = bench.controller(&config);
    assert_eq!(ctrl.state(), CaptureState::Uninitialized);
    assert_eq!(ctrl.poll(), None);

    ctrl.initialize(&mut bench.router).unwrap();
    assert_eq!(ctrl.state(), CaptureState::Armed);

    bench.pulse_us(SAMPLE_PIN, 10);
    assert_eq!(ctrl.state(), CaptureState::CaptureAvailable);

    ctrl.poll();
    assert_eq!(ctrl.state(), CaptureState::Armed);
}

#[test]
fn sixteen_mhz_counts_base_clock_cycles() {
    let (bench, mut ctrl) = armed(TimerFrequency::F16MHz);
    bench.pulse(SAMPLE_PIN, 12_345);

    let width = ctrl.poll().unwrap();
    assert_eq!(width.ticks(), 12_345);
    assert_eq!(width.as_micros(), 12_345 / 16);
}

#[test]
fn slow_prescaler_truncates_to_whole_ticks() {
    let (bench, mut ctrl) = armed(TimerFrequency::F31250Hz);
    // 512 cycles per tick; 3.5 ticks reads as 3.
    bench.pulse(SAMPLE_PIN, 512 * 3 + 256);
    assert_eq!(ctrl.poll().map(|w| w.ticks()), Some(3));
}

#[test]
fn routes_use_two_live_channels() {
    let (bench, ctrl) = armed(TimerFrequency::F1MHz);
    assert_eq!(ctrl.route_ids(), Some((0, 1)));
    assert_eq!(bench.soc.routes_enabled(), 2);
    assert_eq!(bench.soc.routes_assigned(), 2);
}

#[test]
fn second_initialize_is_rejected() {
    let (mut bench, mut ctrl) = armed(TimerFrequency::F1MHz);
    let free = bench.router.free_channels();

    assert_eq!(ctrl.initialize(&mut bench.router), Err(Error::AlreadyInitialized));
    assert_eq!(bench.router.free_channels(), free, "no channel leaked");
    assert_eq!(bench.soc.routes_enabled(), 2);
}

#[test]
fn exhausted_router_leaves_nothing_behind() {
    let mut bench = Bench::new();
    let mut ctrl = bench.controller(&CaptureConfig::default());
    let _held = bench.leave_free(1);

    assert_eq!(
        ctrl.initialize(&mut bench.router),
        Err(Error::ResourceExhausted(Resource::RouterChannel))
    );
    assert_eq!(bench.router.free_channels(), 1, "first channel rolled back");
    assert_eq!(bench.soc.routes_enabled(), 0);
    assert_eq!(bench.soc.routes_assigned(), 0);
    assert_eq!(ctrl.state(), CaptureState::Uninitialized);

    // The input was never configured: edges are not latched.
    bench.pulse_us(SAMPLE_PIN, 10);
    assert_eq!(ctrl.poll(), None);
}

#[test]
fn shutdown_returns_every_resource() {
    let (mut bench, mut ctrl) = armed(TimerFrequency::F1MHz);
    bench.pulse_us(SAMPLE_PIN, 50);

    ctrl.shutdown(&mut bench.router);
    assert_eq!(ctrl.state(), CaptureState::Uninitialized);
    assert_eq!(ctrl.route_ids(), None);
    assert_eq!(bench.soc.routes_enabled(), 0);
    assert_eq!(bench.soc.routes_assigned(), 0);
    assert_eq!(bench.router.free_channels(), pulsecap::sim::PPI_CHANNELS as u8);

    // Edges no longer latch, and the pending capture went with the routes.
    bench.pulse_us(SAMPLE_PIN, 20);
    assert_eq!(ctrl.poll(), None);

    // A second shutdown does nothing; re-arming works from scratch.
    ctrl.shutdown(&mut bench.router);
    ctrl.initialize(&mut bench.router).unwrap();
    assert_eq!(ctrl.route_ids(), Some((0, 1)));
    bench.pulse_us(SAMPLE_PIN, 300);
    assert_eq!(ctrl.poll().map(|w| w.ticks()), Some(300));
}

#[test]
fn edges_before_initialize_are_not_captures() {
    let mut bench = Bench::new();
    let mut ctrl = bench.controller(&CaptureConfig::default());
    bench.pulse_us(SAMPLE_PIN, 40);

    ctrl.initialize(&mut bench.router).unwrap();
    assert_eq!(ctrl.poll(), None);
}
