// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sending and reading messages inside an existing conversation.

use std::sync::Arc;

use courierlink_core::{
    Conversation, ConversationId, CourierlinkError, Identity, MatchStore, Message, NewMessage,
    Role, SessionProvider,
};
use courierlink_plans::gate::{GateState, require_message_quota};
use courierlink_plans::plan_status;
use serde::Serialize;
use tracing::debug;

/// A stored message with the gate decision that let it through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessage {
    pub message: Message,
    /// Quota state observed before the insert.
    pub gate: GateState,
}

/// Message operations on behalf of the signed-in user.
#[derive(Clone)]
pub struct MessageSender {
    store: Arc<dyn MatchStore>,
    session: Arc<dyn SessionProvider>,
}

impl MessageSender {
    pub fn new(store: Arc<dyn MatchStore>, session: Arc<dyn SessionProvider>) -> Self {
        Self { store, session }
    }

    /// Send `content` into a conversation the current user takes part in.
    ///
    /// A business sender is checked against its quota, read fresh for this
    /// attempt. The store repeats the check atomically with the insert, so a
    /// send that loses a race still fails with `QuotaExhausted`.
    pub async fn send(
        &self,
        conversation_id: &ConversationId,
        content: &str,
    ) -> Result<SentMessage, CourierlinkError> {
        let (me, conversation, role) = self.participant(conversation_id).await?;

        let content = content.trim();
        if content.is_empty() {
            return Err(CourierlinkError::EmptyMessage);
        }

        let gate = match role {
            Role::Business => {
                let record = self
                    .store
                    .get_business_plan_status(&me.user_id)
                    .await?
                    .ok_or_else(|| CourierlinkError::NotFound {
                        entity: "business",
                        id: me.user_id.to_string(),
                    })?;
                require_message_quota(&plan_status(&record))?
            }
            Role::Courier => GateState::Allowed,
        };

        let message = self
            .store
            .insert_message(&NewMessage {
                conversation_id: conversation.id.clone(),
                sender_id: me.user_id.clone(),
                content: content.to_string(),
            })
            .await?;
        debug!(conversation_id = %conversation.id, message_id = ?message.id, "message sent");
        Ok(SentMessage { message, gate })
    }

    /// Conversation history, oldest first.
    pub async fn history(
        &self,
        conversation_id: &ConversationId,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, CourierlinkError> {
        self.participant(conversation_id).await?;
        self.store.list_messages(conversation_id, limit).await
    }

    /// Mark the counterpart's messages as read. Returns how many changed.
    pub async fn mark_read(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<usize, CourierlinkError> {
        let (me, _, _) = self.participant(conversation_id).await?;
        self.store.mark_read(conversation_id, &me.user_id).await
    }

    async fn participant(
        &self,
        conversation_id: &ConversationId,
    ) -> Result<(Identity, Conversation, Role), CourierlinkError> {
        let me = self
            .session
            .current_user()
            .await?
            .ok_or(CourierlinkError::Unauthenticated)?;
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| CourierlinkError::NotFound {
                entity: "conversation",
                id: conversation_id.to_string(),
            })?;
        let role = conversation
            .role_of(&me.user_id)
            .ok_or_else(|| CourierlinkError::NotParticipant(conversation.id.clone()))?;
        Ok((me, conversation, role))
    }
}
