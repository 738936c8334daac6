//! Self-test pulse generator.
//!
//! A second timer and a task-mode GPIOTE channel produce a periodic pulse
//! with no CPU involvement:
//!
//! ```text
//!   count:   0 ────────── on ───── on+off (COMPARE1 → CLEAR short)
//!   pin:     ┌────────────┐          ┌──────
//!            │   high     │   low    │
//!   ─────────┘            └──────────┘
//!   route:   COMPARE0 → pin CLR     COMPARE1 → pin SET
//! ```
//!
//! The pin starts low, so the first high phase begins at `on + off`.
//! From then on it is high for exactly `on` ticks per period, which is
//! what the capture controller should report when looped back.
//!
//! There is no stop: once started the generator runs for the rest of the
//! process.

use log::info;

use crate::config::SelfTestConfig;
use crate::drivers::pin_output::PinOutput;
use crate::drivers::router::{BoundChannel, EventRouter};
use crate::error::{ConfigError, Result};
use crate::hw::{BitWidth, GpioteChannelHw, Level, PpiHw, TimerEvent, TimerHw, TimerTask};

/// CC register marking the falling edge.
const CC_ON: u8 = 0;
/// CC register marking the rising edge and the end of the period.
const CC_PERIOD: u8 = 1;

const WIDTH: BitWidth = BitWidth::Bits32;

pub struct SelfTestGenerator<E: GpioteChannelHw, T: TimerHw> {
    output: PinOutput<E>,
    timer: T,
    on_ticks: u32,
    period_ticks: u32,
    _clear_route: BoundChannel,
    _set_route: BoundChannel,
}

impl<E: GpioteChannelHw, T: TimerHw> SelfTestGenerator<E, T> {
    /// Validate, wire and start.  Validation and channel allocation both
    /// happen before the first register write.
    pub fn start<R: PpiHw>(
        router: &mut EventRouter<R>,
        channel: E,
        mut timer: T,
        config: &SelfTestConfig,
    ) -> Result<Self> {
        let period_ticks = validate_durations(config.on_ticks, config.off_ticks, WIDTH)?;
        if timer.cc_count() <= CC_PERIOD {
            return Err(ConfigError::MissingCompareRegister(CC_PERIOD).into());
        }
        let mut output = PinOutput::new(config.pin, channel)?;

        let clear_ch = router.allocate()?;
        let set_ch = match router.allocate() {
            Ok(ch) => ch,
            Err(e) => {
                router.release(clear_ch);
                return Err(e);
            }
        };

        timer.configure(config.frequency, WIDTH);
        timer.set_compare(CC_ON, config.on_ticks, false);
        timer.set_compare(CC_PERIOD, period_ticks, true);

        output.configure(Level::Low);

        let clear_route = router.bind(
            clear_ch,
            timer.event_address(TimerEvent::Compare(CC_ON)),
            output.clear_task_address(),
        );
        let set_route = router.bind(
            set_ch,
            timer.event_address(TimerEvent::Compare(CC_PERIOD)),
            output.set_task_address(),
        );
        router.enable(&clear_route);
        router.enable(&set_route);

        timer.trigger(TimerTask::Clear);
        timer.trigger(TimerTask::Start);

        info!(
            "self-test: pin {} high {} / period {} ticks at {} Hz",
            output.pin(),
            config.on_ticks,
            period_ticks,
            config.frequency.hz()
        );

        Ok(Self {
            output,
            timer,
            on_ticks: config.on_ticks,
            period_ticks,
            _clear_route: clear_route,
            _set_route: set_route,
        })
    }

    pub fn pin(&self) -> u8 {
        self.output.pin()
    }

    pub fn on_ticks(&self) -> u32 {
        self.on_ticks
    }

    pub fn period_ticks(&self) -> u32 {
        self.period_ticks
    }

    /// CC values as programmed into the timer, `(on, period)`.
    pub fn programmed_compares(&self) -> (u32, u32) {
        (
            self.timer.compare_value(CC_ON),
            self.timer.compare_value(CC_PERIOD),
        )
    }
}

/// `0 < on < on + off <= max_count`.  Returns the period.
pub fn validate_durations(
    on_ticks: u32,
    off_ticks: u32,
    width: BitWidth,
) -> core::result::Result<u32, ConfigError> {
    if on_ticks == 0 {
        return Err(ConfigError::ZeroOnDuration);
    }
    if off_ticks == 0 {
        return Err(ConfigError::ZeroOffDuration);
    }
    match on_ticks.checked_add(off_ticks) {
        Some(period) if period <= width.max_count() => Ok(period),
        _ => Err(ConfigError::PeriodOverflow),
    }
}
