// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime change feed trait and subscription handle.

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::debug;

use crate::types::{ChangeEvent, FeedChannel};

/// Source of realtime row changes.
///
/// Subscriptions are one-way: there is no acknowledgment and no
/// backpressure. Events arrive in publish order per subscriber.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, channel: FeedChannel) -> Subscription;
}

/// A live subscription to one [`FeedChannel`].
///
/// Dropping the subscription unsubscribes.
pub struct Subscription {
    channel: FeedChannel,
    rx: broadcast::Receiver<ChangeEvent>,
}

impl Subscription {
    pub fn new(channel: FeedChannel, rx: broadcast::Receiver<ChangeEvent>) -> Self {
        Self { channel, rx }
    }

    pub fn channel(&self) -> &FeedChannel {
        &self.channel
    }

    /// Wait for the next event on this channel.
    ///
    /// Returns `None` once the feed is closed. A subscriber that fell behind
    /// skips the events it missed.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.channel.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(channel = %self.channel, skipped, "subscriber lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`Subscription::next`].
    pub fn try_next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if self.channel.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(channel = %self.channel, skipped, "subscriber lagged, events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ConversationId, Message, MessageId, UserId};

    fn inserted(conversation: &str, id: &str) -> ChangeEvent {
        ChangeEvent::MessageInserted {
            message: Message {
                id: MessageId(id.into()),
                conversation_id: ConversationId::from(conversation),
                sender_id: UserId::from("biz"),
                content: "selam".into(),
                is_read: false,
                created_at: "2026-01-01T00:00:00.000Z".into(),
            },
            recipient_id: UserId::from("cou"),
        }
    }

    #[tokio::test]
    async fn next_skips_events_for_other_channels() {
        let (tx, rx) = broadcast::channel(8);
        let mut sub = Subscription::new(FeedChannel::Conversation(ConversationId::from("a")), rx);
        tx.send(inserted("b", "m1")).unwrap();
        tx.send(inserted("a", "m2")).unwrap();

        let event = sub.next().await.unwrap();
        assert_eq!(event, inserted("a", "m2"));
    }

    #[tokio::test]
    async fn next_returns_none_when_feed_closes() {
        let (tx, rx) = broadcast::channel::<ChangeEvent>(8);
        let mut sub = Subscription::new(FeedChannel::Conversation(ConversationId::from("a")), rx);
        drop(tx);
        assert!(sub.next().await.is_none());
    }

    #[test]
    fn lagging_subscriber_keeps_latest_events() {
        let (tx, rx) = broadcast::channel(2);
        let mut sub = Subscription::new(FeedChannel::Conversation(ConversationId::from("a")), rx);
        for i in 0..5 {
            tx.send(inserted("a", &format!("m{i}"))).unwrap();
        }
        assert_eq!(sub.try_next(), Some(inserted("a", "m3")));
        assert_eq!(sub.try_next(), Some(inserted("a", "m4")));
        assert_eq!(sub.try_next(), None);
    }
}
