// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Find-or-create for the single conversation between a business and a courier.

use std::sync::Arc;

use courierlink_core::{Conversation, ConversationPair, CourierlinkError, MatchStore, UserId};
use tracing::{debug, info};

/// Resolves a `(business, courier)` pair to its conversation.
///
/// The store's uniqueness constraint is the only arbiter between concurrent
/// creators. A creator that loses the race reads the winner's record.
#[derive(Clone)]
pub struct ConversationResolver {
    store: Arc<dyn MatchStore>,
}

impl ConversationResolver {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    /// Return the conversation for the pair, creating it if none exists.
    ///
    /// Idempotent: repeated calls return the same conversation id.
    pub async fn resolve_or_create(
        &self,
        business_id: &UserId,
        courier_id: &UserId,
    ) -> Result<Conversation, CourierlinkError> {
        let pair = ConversationPair::new(business_id.clone(), courier_id.clone());
        if pair.is_self_pair() {
            return Err(CourierlinkError::SelfContactRejected);
        }

        if let Some(existing) = self.store.find_conversation_by_pair(&pair).await? {
            return Ok(existing);
        }

        match self.store.insert_conversation(&pair).await {
            Ok(created) => {
                info!(
                    conversation_id = %created.id,
                    business_id = %pair.business_id,
                    courier_id = %pair.courier_id,
                    "conversation created"
                );
                Ok(created)
            }
            Err(CourierlinkError::ConstraintCollision { .. }) => {
                debug!(
                    business_id = %pair.business_id,
                    courier_id = %pair.courier_id,
                    "conversation created concurrently, re-reading"
                );
                self.store
                    .find_conversation_by_pair(&pair)
                    .await?
                    .ok_or_else(|| {
                        CourierlinkError::Internal(format!(
                            "conversation for business {} and courier {} collided but is not readable",
                            pair.business_id, pair.courier_id
                        ))
                    })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courierlink_test_utils::MockStore;

    fn ids() -> (UserId, UserId) {
        (UserId::from("biz"), UserId::from("cou"))
    }

    #[tokio::test]
    async fn repeated_resolution_is_idempotent() {
        let store = Arc::new(MockStore::new());
        let resolver = ConversationResolver::new(store.clone());
        let (biz, cou) = ids();

        let first = resolver.resolve_or_create(&biz, &cou).await.unwrap();
        let second = resolver.resolve_or_create(&biz, &cou).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.conversation_count().await, 1);
        assert_eq!(store.insert_calls(), 1);
    }

    #[tokio::test]
    async fn collision_recovers_with_existing_record() {
        let store = Arc::new(MockStore::new());
        let resolver = ConversationResolver::new(store.clone());
        let (biz, cou) = ids();
        store.stage_race(ConversationPair::new(biz.clone(), cou.clone())).await;

        let resolved = resolver.resolve_or_create(&biz, &cou).await.unwrap();
        assert_eq!(store.conversation_count().await, 1);
        assert_eq!(store.lookup_calls(), 2, "one miss, one retry");
        assert_eq!(store.insert_calls(), 1);

        let again = resolver.resolve_or_create(&biz, &cou).await.unwrap();
        assert_eq!(resolved.id, again.id);
    }

    #[tokio::test]
    async fn self_pair_is_rejected_before_any_query() {
        let store = Arc::new(MockStore::new());
        let resolver = ConversationResolver::new(store.clone());
        let same = UserId::from("same");

        let err = resolver.resolve_or_create(&same, &same).await.unwrap_err();
        assert!(matches!(err, CourierlinkError::SelfContactRejected));
        assert_eq!(store.lookup_calls(), 0);
    }

    #[tokio::test]
    async fn store_failure_propagates_without_insert() {
        let store = Arc::new(MockStore::new());
        let resolver = ConversationResolver::new(store.clone());
        store.set_failing(true);
        let (biz, cou) = ids();

        let err = resolver.resolve_or_create(&biz, &cou).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(store.insert_calls(), 0);
    }

    #[tokio::test]
    async fn distinct_pairs_get_distinct_conversations() {
        let store = Arc::new(MockStore::new());
        let resolver = ConversationResolver::new(store.clone());
        let biz = UserId::from("biz");

        let a = resolver.resolve_or_create(&biz, &UserId::from("c1")).await.unwrap();
        let b = resolver.resolve_or_create(&biz, &UserId::from("c2")).await.unwrap();
        assert_ne!(a.id, b.id);
    }
}
