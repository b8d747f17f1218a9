// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for courierlink.

use thiserror::Error;

use crate::types::{ConversationId, PlanTier, Role, UserId};

/// The error type shared by the gate, the resolver, and every collaborator trait.
///
/// Every variant is scoped to the single user interaction that produced it.
/// None of them is fatal to the process.
#[derive(Debug, Error)]
pub enum CourierlinkError {
    /// No active session. Callers redirect to sign-in instead of showing a banner.
    #[error("authentication required")]
    Unauthenticated,

    /// The acting identity lacks the profile complementary to the target's role.
    #[error("a {required} profile is required to message {target} accounts")]
    RoleMismatch { required: Role, target: Role },

    /// Sender and target resolve to the same identity.
    #[error("cannot start a conversation with yourself")]
    SelfContactRejected,

    /// The sending business has no messages left today.
    #[error("daily message limit of {limit} reached on the {tier} plan")]
    QuotaExhausted { tier: PlanTier, limit: i64 },

    /// The target business's plan does not accept courier-initiated contact.
    #[error("businesses on the {tier} plan do not accept inbound requests")]
    InboundRequestsDisabled { tier: PlanTier },

    /// A concurrent insert already created the conversation for this pair.
    #[error("conversation between business {business_id} and courier {courier_id} already exists")]
    ConstraintCollision {
        business_id: UserId,
        courier_id: UserId,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The acting identity is not one of the conversation's two parties.
    #[error("user is not a participant of conversation {0}")]
    NotParticipant(ConversationId),

    /// Message content was empty after trimming.
    #[error("message content must not be empty")]
    EmptyMessage,

    /// Lookup, insert, or update against the data store failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors surfaced at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CourierlinkError {
    /// Wrap any infrastructure error as a store operation failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }

    /// Whether a user-initiated retry (re-click) may succeed.
    ///
    /// Nothing in the core retries automatically.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage { .. })
    }
}
