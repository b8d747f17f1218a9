// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data store collaborator trait.

use async_trait::async_trait;

use crate::error::CourierlinkError;
use crate::types::{
    BusinessRecord, Conversation, ConversationId, ConversationPair, HealthStatus, Message,
    NewMessage, Profile, Role, UserId,
};

/// Typed operations against the relational store.
///
/// Each method is a fresh query; implementations hold no authoritative
/// in-memory copy. The store must enforce uniqueness of
/// `(business_id, courier_id)` on conversations.
#[async_trait]
pub trait MatchStore: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    async fn health_check(&self) -> Result<HealthStatus, CourierlinkError>;

    /// Exact-pair conversation lookup.
    async fn find_conversation_by_pair(
        &self,
        pair: &ConversationPair,
    ) -> Result<Option<Conversation>, CourierlinkError>;

    /// Insert a conversation for `pair` and return the stored record.
    ///
    /// Fails with [`CourierlinkError::ConstraintCollision`] when the pair
    /// already has a conversation.
    async fn insert_conversation(
        &self,
        pair: &ConversationPair,
    ) -> Result<Conversation, CourierlinkError>;

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, CourierlinkError>;

    /// Conversations `user` takes part in, most recently updated first.
    async fn list_conversations(&self, user: &UserId)
    -> Result<Vec<Conversation>, CourierlinkError>;

    /// The business row owned by `user`, with counters already rolled over
    /// if the daily boundary has passed.
    async fn get_business_plan_status(
        &self,
        user: &UserId,
    ) -> Result<Option<BusinessRecord>, CourierlinkError>;

    /// The profile of `role` owned by `user`, if any.
    async fn find_profile(
        &self,
        user: &UserId,
        role: Role,
    ) -> Result<Option<Profile>, CourierlinkError>;

    /// Insert a message. Usage counters move as a store-side effect.
    ///
    /// A business sender whose daily quota is used up gets
    /// [`CourierlinkError::QuotaExhausted`] and nothing is stored. The check
    /// and the increment are atomic with the insert.
    async fn insert_message(&self, message: &NewMessage) -> Result<Message, CourierlinkError>;

    /// Messages of a conversation in chronological order.
    async fn list_messages(
        &self,
        conversation: &ConversationId,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, CourierlinkError>;

    /// Mark every message not sent by `reader` as read. Returns the number updated.
    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
    ) -> Result<usize, CourierlinkError>;
}
