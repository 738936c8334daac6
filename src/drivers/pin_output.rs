//! Hardware-driven output pin (one GPIOTE channel in task mode).
//!
//! Once configured, the pin is driven only by routed SET/CLR tasks; the
//! CPU never writes it.

use log::debug;

use crate::error::{ConfigError, Result};
use crate::hw::{GpioteChannelHw, Level, PinTask, Polarity, TaskAddr};
use crate::pins;

pub struct PinOutput<E: GpioteChannelHw> {
    pin: u8,
    channel: E,
}

impl<E: GpioteChannelHw> PinOutput<E> {
    pub fn new(pin: u8, channel: E) -> Result<Self> {
        if !pins::is_valid(pin) {
            return Err(ConfigError::PinOutOfRange(pin).into());
        }
        Ok(Self { pin, channel })
    }

    /// Hand the pin to the channel, starting from `initial`.
    pub fn configure(&mut self, initial: Level) {
        self.channel
            .configure_task(self.pin, Polarity::Toggle, initial);
        debug!(
            "pin output: pin {} on ch{} (initial {:?})",
            self.pin,
            self.channel.index(),
            initial
        );
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    pub fn set_task_address(&self) -> TaskAddr {
        self.channel.task_address(PinTask::Set)
    }

    pub fn clear_task_address(&self) -> TaskAddr {
        self.channel.task_address(PinTask::Clear)
    }
}
