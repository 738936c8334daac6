//! Event router driver (PPI channel pool).
//!
//! Hands out channels from the fixed hardware pool and wires them.  The
//! lifecycle is enforced by types rather than checked at run time:
//!
//! ```text
//! allocate() ──▶ Channel ──bind()──▶ BoundChannel ──enable()/disable()
//!                 │                        │
//!                 └──release()──▶ pool ◀──unbind()
//! ```
//!
//! Neither handle is `Clone`, so two logical routes can never alias one
//! physical channel, and a bound channel can never be bound again.

use log::debug;

use crate::error::{Error, Resource, Result};
use crate::hw::{EventAddr, PpiHw, TaskAddr};

/// An allocated, not yet wired routing channel.
#[derive(Debug, PartialEq, Eq)]
pub struct Channel {
    id: u8,
}

impl Channel {
    pub fn id(&self) -> u8 {
        self.id
    }
}

/// A channel wired from `event` to `task`.
#[derive(Debug, PartialEq, Eq)]
pub struct BoundChannel {
    id: u8,
    event: EventAddr,
    task: TaskAddr,
}

impl BoundChannel {
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn event(&self) -> EventAddr {
        self.event
    }

    pub fn task(&self) -> TaskAddr {
        self.task
    }
}

/// Owner of the PPI peripheral and its allocation bitmap.
pub struct EventRouter<R: PpiHw> {
    hw: R,
    /// Bit n set = channel n handed out.
    allocated: u32,
}

impl<R: PpiHw> EventRouter<R> {
    pub fn new(hw: R) -> Self {
        debug_assert!(hw.channel_count() <= 32, "allocation bitmap is 32 bits wide");
        Self { hw, allocated: 0 }
    }

    /// Take the lowest free channel from the pool.
    pub fn allocate(&mut self) -> Result<Channel> {
        let count = self.hw.channel_count();
        let id = (0..count)
            .find(|&ch| self.allocated & (1 << ch) == 0)
            .ok_or(Error::ResourceExhausted(Resource::RouterChannel))?;
        self.allocated |= 1 << id;
        debug!("router: allocated channel {}", id);
        Ok(Channel { id })
    }

    /// Return an unbound channel to the pool.
    pub fn release(&mut self, channel: Channel) {
        self.allocated &= !(1 << channel.id);
        debug!("router: released channel {}", channel.id);
    }

    /// Wire `event` to `task`.  The route stays dormant until enabled.
    pub fn bind(&mut self, channel: Channel, event: EventAddr, task: TaskAddr) -> BoundChannel {
        self.hw.assign(channel.id, event, task);
        debug!("router: channel {} {} -> {}", channel.id, event, task);
        BoundChannel {
            id: channel.id,
            event,
            task,
        }
    }

    /// Disable the route, clear its endpoints and return the channel to
    /// the pool.
    pub fn unbind(&mut self, channel: BoundChannel) {
        self.hw.set_enabled(channel.id, false);
        self.hw.assign(channel.id, EventAddr(0), TaskAddr(0));
        self.allocated &= !(1 << channel.id);
        debug!("router: unbound channel {}", channel.id);
    }

    /// Make the route live.  Applies from the next matching event on.
    pub fn enable(&mut self, channel: &BoundChannel) {
        self.hw.set_enabled(channel.id, true);
    }

    pub fn disable(&mut self, channel: &BoundChannel) {
        self.hw.set_enabled(channel.id, false);
    }

    pub fn is_enabled(&self, channel: &BoundChannel) -> bool {
        self.hw.is_enabled(channel.id)
    }

    /// Channels still available for allocation.
    pub fn free_channels(&self) -> u8 {
        self.hw.channel_count() - self.allocated.count_ones() as u8
    }
}
