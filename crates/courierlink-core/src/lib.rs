// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for courierlink.
//!
//! Holds the data model shared by every crate in the workspace, the error
//! type used across collaborator boundaries, and the narrow traits through
//! which the quota core talks to authentication, storage, and the realtime
//! change feed.

pub mod error;
pub mod traits;
pub mod types;

pub use error::CourierlinkError;
pub use types::{
    BusinessPlanStatus, BusinessRecord, ChangeEvent, Conversation, ConversationId,
    ConversationPair, FeedChannel, HealthStatus, Identity, Message, MessageId, NewMessage,
    PlanTier, Profile, Role, UserId,
};

pub use traits::{ChangeFeed, MatchStore, SessionProvider, Subscription};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_all_interaction_kinds() {
        let _ = CourierlinkError::Unauthenticated;
        let _ = CourierlinkError::RoleMismatch {
            required: Role::Courier,
            target: Role::Business,
        };
        let _ = CourierlinkError::SelfContactRejected;
        let _ = CourierlinkError::QuotaExhausted {
            tier: PlanTier::Free,
            limit: 2,
        };
        let _ = CourierlinkError::InboundRequestsDisabled {
            tier: PlanTier::Standard,
        };
        let _ = CourierlinkError::ConstraintCollision {
            business_id: UserId::from("b"),
            courier_id: UserId::from("c"),
        };
        let _ = CourierlinkError::NotFound {
            entity: "conversation",
            id: "x".into(),
        };
        let _ = CourierlinkError::NotParticipant(ConversationId::from("x"));
        let _ = CourierlinkError::EmptyMessage;
        let _ = CourierlinkError::storage(std::io::Error::other("down"));
        let _ = CourierlinkError::Config("bad".into());
        let _ = CourierlinkError::Internal("oops".into());
    }

    #[test]
    fn only_storage_errors_are_retryable() {
        assert!(CourierlinkError::storage(std::io::Error::other("down")).is_retryable());
        assert!(!CourierlinkError::SelfContactRejected.is_retryable());
        assert!(
            !CourierlinkError::QuotaExhausted {
                tier: PlanTier::Free,
                limit: 2
            }
            .is_retryable()
        );
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_session<T: SessionProvider>() {}
        fn _assert_store<T: MatchStore>() {}
        fn _assert_feed<T: ChangeFeed>() {}
    }
}
