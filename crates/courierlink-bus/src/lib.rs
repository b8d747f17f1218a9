// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process realtime change feed.
//!
//! A single tokio broadcast channel carries every [`ChangeEvent`]; each
//! [`Subscription`] filters it down to one [`FeedChannel`]. Publishing never
//! blocks and never waits for subscribers. Slow subscribers lose the oldest
//! events instead of applying backpressure.

use courierlink_core::{ChangeEvent, ChangeFeed, FeedChannel, Subscription};
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Default number of buffered events per subscriber.
pub const DEFAULT_CAPACITY: usize = 256;

/// Broadcast-backed [`ChangeFeed`].
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ChangeEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Push an event to every live subscriber.
    ///
    /// Returns how many subscribers received it. Having none is not an error.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        match self.tx.send(event) {
            Ok(receivers) => {
                trace!(receivers, "change event published");
                receivers
            }
            Err(_) => {
                debug!("change event dropped, no subscribers");
                0
            }
        }
    }

    /// Number of open subscriptions across all channels.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ChangeFeed for EventBus {
    fn subscribe(&self, channel: FeedChannel) -> Subscription {
        debug!(%channel, "subscribed");
        Subscription::new(channel, self.tx.subscribe())
    }
}
