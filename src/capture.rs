//! Capture controller.
//!
//! Wires the edge detector to the capture timer through two router
//! channels and exposes the result as a poll:
//!
//! ```text
//!   pin ─▶ falling edge ─▶ router ch A ─▶ TIMER CAPTURE[0]
//!       └▶ rising edge  ─▶ router ch B ─▶ TIMER CLEAR
//! ```
//!
//! The rising edge restarts the count, the falling edge latches it, so
//! CC0 holds the high time of the most recent pulse.  Both reactions
//! happen in hardware; software only ever sees the result.
//!
//! ## States
//!
//! | state              | meaning                                        |
//! |--------------------|------------------------------------------------|
//! | `Uninitialized`    | constructed, nothing configured                |
//! | `Armed`            | running, no unconsumed capture                 |
//! | `CaptureAvailable` | a falling edge latched and was not read yet    |
//!
//! `Armed → CaptureAvailable` happens in hardware.  The way back is
//! [`CaptureController::poll`].  A new edge arriving before the poll
//! overwrites CC0: last value wins, there is no capture queue.
//! [`CaptureController::shutdown`] returns any state to `Uninitialized`.

use log::{debug, info, warn};

use crate::config::CaptureConfig;
use crate::drivers::capture_timer::CaptureTimer;
use crate::drivers::edge::EdgeDetector;
use crate::drivers::router::{BoundChannel, EventRouter};
use crate::error::{Error, Result};
use crate::hw::{BitWidth, GpioteChannelHw, PpiHw, TimerHw};
use crate::measurement::PulseWidth;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Uninitialized,
    Armed,
    CaptureAvailable,
}

/// The two live routes.  Held for ownership only; nothing reconfigures
/// them after bring-up.
#[derive(Debug)]
struct CaptureRoutes {
    capture: BoundChannel,
    restart: BoundChannel,
}

pub struct CaptureController<E: GpioteChannelHw, T: TimerHw> {
    edges: EdgeDetector<E>,
    timer: CaptureTimer<T>,
    width: BitWidth,
    routes: Option<CaptureRoutes>,
}

impl<E: GpioteChannelHw, T: TimerHw> CaptureController<E, T> {
    /// Build an uninitialized controller from its exclusively owned parts.
    pub fn new(edges: EdgeDetector<E>, timer: CaptureTimer<T>, width: BitWidth) -> Self {
        Self {
            edges,
            timer,
            width,
            routes: None,
        }
    }

    /// Build from configuration, taking ownership of two GPIOTE channels
    /// and one timer.
    pub fn from_config(
        config: &CaptureConfig,
        falling: E,
        rising: E,
        timer: T,
    ) -> Result<Self> {
        let edges = EdgeDetector::new(config.input_pin, config.input_pull, falling, rising)?;
        let timer = CaptureTimer::new(timer, config.frequency);
        Ok(Self::new(edges, timer, config.bit_width))
    }

    /// `Uninitialized → Armed`.
    ///
    /// Both router channels are allocated before any register is written.
    /// If the second allocation fails the first is released, so a failed
    /// call leaves no route assigned and no peripheral configured.
    pub fn initialize<R: PpiHw>(&mut self, router: &mut EventRouter<R>) -> Result<()> {
        if self.routes.is_some() {
            return Err(Error::AlreadyInitialized);
        }

        let capture_ch = router.allocate()?;
        let restart_ch = match router.allocate() {
            Ok(ch) => ch,
            Err(e) => {
                router.release(capture_ch);
                return Err(e);
            }
        };

        self.timer.configure(self.width);
        self.edges.configure();

        let capture = router.bind(
            capture_ch,
            self.edges.falling_event_address(),
            self.timer.capture_task_address(),
        );
        let restart = router.bind(
            restart_ch,
            self.edges.rising_event_address(),
            self.timer.clear_task_address(),
        );
        router.enable(&capture);
        router.enable(&restart);

        // Anything latched before the routes went live is not a capture.
        self.edges.clear_falling();
        self.timer.start();

        info!(
            "capture: armed on pin {} (router ch{}/ch{}, {} Hz)",
            self.edges.pin(),
            capture.id(),
            restart.id(),
            self.timer.frequency().hz()
        );
        self.routes = Some(CaptureRoutes { capture, restart });
        Ok(())
    }

    /// `Armed | CaptureAvailable → Uninitialized`.
    ///
    /// Routes come down first, then the timer stops and the edge channels
    /// are released.  Both router channels go back to the pool.  A no-op
    /// when not armed.
    pub fn shutdown<R: PpiHw>(&mut self, router: &mut EventRouter<R>) {
        let Some(routes) = self.routes.take() else {
            return;
        };
        router.unbind(routes.capture);
        router.unbind(routes.restart);
        self.timer.stop();
        self.edges.release();
        warn!("capture: disarmed pin {}", self.edges.pin());
    }

    /// Current state, observed from the latched falling-edge event.
    pub fn state(&self) -> CaptureState {
        if self.routes.is_none() {
            CaptureState::Uninitialized
        } else if self.edges.falling_pending() {
            CaptureState::CaptureAvailable
        } else {
            CaptureState::Armed
        }
    }

    /// The width of the most recent pulse, if one was captured since the
    /// last poll.  Never blocks.
    pub fn poll(&mut self) -> Option<PulseWidth> {
        if self.routes.is_none() {
            return None;
        }
        let ticks = self.read_and_clear()?;
        Some(PulseWidth::new(ticks, self.timer.frequency()))
    }

    /// `CaptureAvailable → Armed`: observe the flag, clear it, read CC0,
    /// as one step.
    fn read_and_clear(&mut self) -> Option<u32> {
        critical_section::with(|_| {
            if !self.edges.falling_pending() {
                return None;
            }
            self.edges.clear_falling();
            let ticks = self.timer.read_capture_register();
            debug!("capture: consumed {} ticks", ticks);
            Some(ticks)
        })
    }

    /// Router channel ids `(capture, restart)` once armed.
    pub fn route_ids(&self) -> Option<(u8, u8)> {
        self.routes
            .as_ref()
            .map(|r| (r.capture.id(), r.restart.id()))
    }
}
