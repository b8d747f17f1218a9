// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client-side view of a conversation kept current by the change feed.
//!
//! Events are applied in arrival order. There is no reordering and no
//! acknowledgment; the last event to arrive for a message wins.

use courierlink_core::{
    ChangeEvent, ChangeFeed, ConversationId, CourierlinkError, FeedChannel, MatchStore, Message,
    Subscription, UserId,
};
use tracing::trace;

/// Messages of one conversation as the interface renders them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationView {
    conversation_id: ConversationId,
    messages: Vec<Message>,
}

impl ConversationView {
    /// An empty view, before any history is loaded.
    pub fn new(conversation_id: ConversationId) -> Self {
        Self {
            conversation_id,
            messages: Vec::new(),
        }
    }

    /// Load up to `limit` recent messages and subscribe for what follows.
    ///
    /// The subscription is opened first so nothing inserted between the
    /// read and the subscribe is missed.
    pub async fn open(
        store: &dyn MatchStore,
        feed: &dyn ChangeFeed,
        conversation_id: ConversationId,
        limit: Option<i64>,
    ) -> Result<(Self, Subscription), CourierlinkError> {
        let subscription = feed.subscribe(FeedChannel::Conversation(conversation_id.clone()));
        let history = store.list_messages(&conversation_id, limit).await?;
        let mut view = Self::new(conversation_id);
        for message in history {
            view.upsert(message);
        }
        Ok((view, subscription))
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Messages `reader` has not read yet.
    pub fn unread_for(&self, reader: &UserId) -> usize {
        self.messages
            .iter()
            .filter(|m| &m.sender_id != reader && !m.is_read)
            .count()
    }

    /// Apply one feed event. Returns whether the view changed.
    pub fn apply(&mut self, event: &ChangeEvent) -> bool {
        match event {
            ChangeEvent::MessageInserted { message, .. }
                if message.conversation_id == self.conversation_id =>
            {
                self.upsert(message.clone());
                true
            }
            ChangeEvent::MessagesRead {
                conversation_id,
                reader_id,
            } if conversation_id == &self.conversation_id => {
                let mut changed = false;
                for message in self
                    .messages
                    .iter_mut()
                    .filter(|m| &m.sender_id != reader_id && !m.is_read)
                {
                    message.is_read = true;
                    changed = true;
                }
                changed
            }
            _ => {
                trace!(conversation_id = %self.conversation_id, "event ignored by view");
                false
            }
        }
    }

    /// Drain every event already waiting on `subscription`.
    pub fn catch_up(&mut self, subscription: &mut Subscription) -> usize {
        let mut applied = 0;
        while let Some(event) = subscription.try_next() {
            if self.apply(&event) {
                applied += 1;
            }
        }
        applied
    }

    fn upsert(&mut self, message: Message) {
        match self.messages.iter_mut().find(|m| m.id == message.id) {
            Some(existing) => *existing = message,
            None => self.messages.push(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courierlink_core::MessageId;

    fn message(id: &str, sender: &str, created_at: &str) -> Message {
        Message {
            id: MessageId(id.into()),
            conversation_id: ConversationId::from("c1"),
            sender_id: UserId::from(sender),
            content: format!("mesaj {id}"),
            is_read: false,
            created_at: created_at.into(),
        }
    }

    fn inserted(message: Message) -> ChangeEvent {
        ChangeEvent::MessageInserted {
            message,
            recipient_id: UserId::from("cou"),
        }
    }

    #[test]
    fn arrival_order_is_kept() {
        let mut view = ConversationView::new(ConversationId::from("c1"));
        view.apply(&inserted(message("m2", "biz", "2026-01-01T00:00:02.000Z")));
        view.apply(&inserted(message("m1", "biz", "2026-01-01T00:00:01.000Z")));

        let ids: Vec<_> = view.messages().iter().map(|m| m.id.0.as_str()).collect();
        assert_eq!(ids, ["m2", "m1"]);
    }

    #[test]
    fn duplicate_delivery_replaces_in_place() {
        let mut view = ConversationView::new(ConversationId::from("c1"));
        view.apply(&inserted(message("m1", "biz", "t1")));
        let mut edited = message("m1", "biz", "t1");
        edited.content = "düzeltildi".into();
        view.apply(&inserted(edited));

        assert_eq!(view.messages().len(), 1);
        assert_eq!(view.messages()[0].content, "düzeltildi");
    }

    #[test]
    fn other_conversations_are_ignored() {
        let mut view = ConversationView::new(ConversationId::from("c1"));
        let mut foreign = message("m1", "biz", "t1");
        foreign.conversation_id = ConversationId::from("c2");
        assert!(!view.apply(&inserted(foreign)));
        assert!(view.messages().is_empty());
    }

    #[test]
    fn read_receipts_mark_counterpart_messages() {
        let mut view = ConversationView::new(ConversationId::from("c1"));
        view.apply(&inserted(message("m1", "biz", "t1")));
        view.apply(&inserted(message("m2", "cou", "t2")));
        assert_eq!(view.unread_for(&UserId::from("cou")), 1);

        let changed = view.apply(&ChangeEvent::MessagesRead {
            conversation_id: ConversationId::from("c1"),
            reader_id: UserId::from("cou"),
        });
        assert!(changed);
        assert_eq!(view.unread_for(&UserId::from("cou")), 0);
        assert_eq!(view.unread_for(&UserId::from("biz")), 1);
    }
}
