//! PPI model: twenty programmable channels, each an (event, task) pair
//! plus an enable bit.

use core::cell::RefCell;
use std::rc::Rc;

use super::SocState;
use crate::hw::{EventAddr, PpiHw, TaskAddr};

pub const PPI_CHANNELS: usize = 20;

#[derive(Default)]
pub(super) struct PpiState {
    pub eep: [u32; PPI_CHANNELS],
    pub tep: [u32; PPI_CHANNELS],
    pub chen: u32,
}

impl PpiState {
    /// Task endpoints of every enabled channel listening on `event`.
    pub fn tasks_for(&self, event: u32) -> impl Iterator<Item = u32> + '_ {
        (0..PPI_CHANNELS)
            .filter(move |&ch| self.chen & (1 << ch) != 0 && self.eep[ch] == event)
            .map(|ch| self.tep[ch])
    }

    pub fn assigned(&self) -> u8 {
        (0..PPI_CHANNELS)
            .filter(|&ch| self.eep[ch] != 0 || self.tep[ch] != 0)
            .count() as u8
    }
}

/// Handle to the router.
pub struct SimPpi {
    pub(super) soc: Rc<RefCell<SocState>>,
}

impl PpiHw for SimPpi {
    fn channel_count(&self) -> u8 {
        PPI_CHANNELS as u8
    }

    fn assign(&mut self, channel: u8, event: EventAddr, task: TaskAddr) {
        let mut soc = self.soc.borrow_mut();
        soc.ppi.eep[channel as usize] = event.0;
        soc.ppi.tep[channel as usize] = task.0;
    }

    fn set_enabled(&mut self, channel: u8, enabled: bool) {
        let mut soc = self.soc.borrow_mut();
        if enabled {
            soc.ppi.chen |= 1 << channel;
        } else {
            soc.ppi.chen &= !(1 << channel);
        }
    }

    fn is_enabled(&self, channel: u8) -> bool {
        self.soc.borrow().ppi.chen & (1 << channel) != 0
    }
}
