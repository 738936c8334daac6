//! Edge detector: two GPIOTE event channels watching one pin.
//!
//! One channel latches on the falling edge, the other on the rising edge.
//! Each has its own `EVENTS_IN` register and can therefore be routed on
//! its own.  The stock GPIOTE driver refuses two channels on the same pin,
//! which is why this driver programs the channels itself.
//!
//! Construction only validates and records; nothing reaches the hardware
//! until [`EdgeDetector::configure`], so a failed bring-up leaves the
//! channels untouched.

use log::debug;

use crate::error::{ConfigError, Result};
use crate::hw::{EventAddr, GpioteChannelHw, Polarity, Pull};
use crate::pins;

pub struct EdgeDetector<E: GpioteChannelHw> {
    pin: u8,
    pull: Pull,
    falling: E,
    rising: E,
}

impl<E: GpioteChannelHw> EdgeDetector<E> {
    pub fn new(pin: u8, pull: Pull, falling: E, rising: E) -> Result<Self> {
        if !pins::is_valid(pin) {
            return Err(ConfigError::PinOutOfRange(pin).into());
        }
        Ok(Self {
            pin,
            pull,
            falling,
            rising,
        })
    }

    /// Put both channels in event mode on the pin.
    pub fn configure(&mut self) {
        self.falling
            .configure_event(self.pin, Polarity::HiToLo, self.pull);
        self.rising.configure_event(self.pin, Polarity::LoToHi, self.pull);
        debug!(
            "edge: pin {} falling->ch{} rising->ch{} ({:?})",
            self.pin,
            self.falling.index(),
            self.rising.index(),
            self.pull
        );
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn falling_event_address(&self) -> EventAddr {
        self.falling.event_address()
    }

    pub fn rising_event_address(&self) -> EventAddr {
        self.rising.event_address()
    }

    /// Whether a falling edge has latched since the last clear.
    pub fn falling_pending(&self) -> bool {
        self.falling.event_pending()
    }

    pub fn clear_falling(&mut self) {
        self.falling.clear_event();
    }

    /// Return both channels to disabled mode.
    pub fn release(&mut self) {
        self.falling.disable();
        self.rising.disable();
        debug!("edge: pin {} released", self.pin);
    }
}
