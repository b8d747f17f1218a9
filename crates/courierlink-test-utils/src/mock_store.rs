// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory store for deterministic testing.
//!
//! `MockStore` implements `MatchStore` with the same observable rules as the
//! SQLite schema: one conversation per pair, and business usage that moves
//! only when a business sends a message and is refused once the plan's
//! daily limit is reached. It can also stage a concurrent
//! creator and fail on demand.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::sync::Mutex;

use courierlink_bus::EventBus;
use courierlink_core::{
    BusinessRecord, ChangeEvent, Conversation, ConversationId, ConversationPair,
    CourierlinkError, HealthStatus, MatchStore, Message, MessageId, NewMessage, PlanTier, Profile,
    Role, UserId,
};
use courierlink_plans::gate::evaluate_messages;
use courierlink_plans::plan_status;

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Default)]
struct State {
    profiles: HashMap<(UserId, Role), Profile>,
    businesses: HashMap<UserId, BusinessRecord>,
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    /// Pairs whose next lookup misses while another creator inserts them.
    staged_races: Vec<ConversationPair>,
}

/// An in-memory `MatchStore`.
pub struct MockStore {
    state: Arc<Mutex<State>>,
    events: Option<Arc<EventBus>>,
    failing: AtomicBool,
    lookups: AtomicUsize,
    inserts: AtomicUsize,
}

impl MockStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            events: None,
            failing: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
            inserts: AtomicUsize::new(0),
        }
    }

    /// Publish row changes to `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Add a courier profile for `user`.
    pub async fn add_courier(&self, user: &str, full_name: &str) -> Profile {
        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: UserId::from(user),
            role: Role::Courier,
            display_name: full_name.to_string(),
            created_at: now(),
        };
        self.state
            .lock()
            .await
            .profiles
            .insert((profile.user_id.clone(), Role::Courier), profile.clone());
        profile
    }

    /// Add a business profile for `user` on `plan` with zero usage.
    pub async fn add_business(&self, user: &str, business_name: &str, plan: PlanTier) -> Profile {
        let ts = now();
        let profile = Profile {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: UserId::from(user),
            role: Role::Business,
            display_name: business_name.to_string(),
            created_at: ts.clone(),
        };
        let record = BusinessRecord {
            id: profile.id.clone(),
            user_id: profile.user_id.clone(),
            business_name: business_name.to_string(),
            plan,
            messages_sent_today: 0,
            approvals_today: 0,
            last_usage_reset: ts.clone(),
            plan_updated_at: ts,
        };
        let mut state = self.state.lock().await;
        state
            .profiles
            .insert((profile.user_id.clone(), Role::Business), profile.clone());
        state.businesses.insert(profile.user_id.clone(), record);
        profile
    }

    /// Overwrite today's message usage of a business.
    pub async fn set_messages_sent(&self, user: &str, sent: i64) {
        if let Some(record) = self.state.lock().await.businesses.get_mut(&UserId::from(user)) {
            record.messages_sent_today = sent;
        }
    }

    /// Change the plan of a business.
    pub async fn set_plan(&self, user: &str, plan: PlanTier) {
        if let Some(record) = self.state.lock().await.businesses.get_mut(&UserId::from(user)) {
            record.plan = plan;
            record.plan_updated_at = now();
        }
    }

    /// Make the next lookup of `pair` miss while a concurrent creator
    /// inserts the conversation, so the caller's own insert collides.
    pub async fn stage_race(&self, pair: ConversationPair) {
        self.state.lock().await.staged_races.push(pair);
    }

    /// Fail every subsequent operation with a storage error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of conversations currently stored.
    pub async fn conversation_count(&self) -> usize {
        self.state.lock().await.conversations.len()
    }

    /// Calls made to `find_conversation_by_pair`.
    pub fn lookup_calls(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Calls made to `insert_conversation`.
    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    fn check_failing(&self) -> Result<(), CourierlinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CourierlinkError::storage(std::io::Error::other(
                "mock store unavailable",
            )));
        }
        Ok(())
    }

    fn publish(&self, event: ChangeEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    fn new_conversation(pair: &ConversationPair) -> Conversation {
        let ts = now();
        Conversation {
            id: ConversationId(uuid::Uuid::new_v4().to_string()),
            business_id: pair.business_id.clone(),
            courier_id: pair.courier_id.clone(),
            created_at: ts.clone(),
            updated_at: ts,
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchStore for MockStore {
    fn name(&self) -> &str {
        "mock-store"
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierlinkError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Unhealthy("mock store unavailable".to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn find_conversation_by_pair(
        &self,
        pair: &ConversationPair,
    ) -> Result<Option<Conversation>, CourierlinkError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        let mut state = self.state.lock().await;

        if let Some(pos) = state.staged_races.iter().position(|p| p == pair) {
            state.staged_races.remove(pos);
            if !state.conversations.iter().any(|c| &c.pair() == pair) {
                let other = Self::new_conversation(pair);
                state.conversations.push(other);
            }
            return Ok(None);
        }

        Ok(state
            .conversations
            .iter()
            .find(|c| &c.pair() == pair)
            .cloned())
    }

    async fn insert_conversation(
        &self,
        pair: &ConversationPair,
    ) -> Result<Conversation, CourierlinkError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        let conversation = {
            let mut state = self.state.lock().await;
            if state.conversations.iter().any(|c| &c.pair() == pair) {
                return Err(CourierlinkError::ConstraintCollision {
                    business_id: pair.business_id.clone(),
                    courier_id: pair.courier_id.clone(),
                });
            }
            let conversation = Self::new_conversation(pair);
            state.conversations.push(conversation.clone());
            conversation
        };
        self.publish(ChangeEvent::ConversationCreated(conversation.clone()));
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, CourierlinkError> {
        self.check_failing()?;
        let state = self.state.lock().await;
        Ok(state.conversations.iter().find(|c| &c.id == id).cloned())
    }

    async fn list_conversations(
        &self,
        user: &UserId,
    ) -> Result<Vec<Conversation>, CourierlinkError> {
        self.check_failing()?;
        let state = self.state.lock().await;
        let mut conversations: Vec<_> = state
            .conversations
            .iter()
            .filter(|c| c.role_of(user).is_some())
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn get_business_plan_status(
        &self,
        user: &UserId,
    ) -> Result<Option<BusinessRecord>, CourierlinkError> {
        self.check_failing()?;
        Ok(self.state.lock().await.businesses.get(user).cloned())
    }

    async fn find_profile(
        &self,
        user: &UserId,
        role: Role,
    ) -> Result<Option<Profile>, CourierlinkError> {
        self.check_failing()?;
        let state = self.state.lock().await;
        Ok(state.profiles.get(&(user.clone(), role)).cloned())
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, CourierlinkError> {
        self.check_failing()?;
        let (stored, recipient_id) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            let conversation = state
                .conversations
                .iter_mut()
                .find(|c| c.id == message.conversation_id)
                .ok_or_else(|| CourierlinkError::NotFound {
                    entity: "conversation",
                    id: message.conversation_id.to_string(),
                })?;
            let recipient_id = conversation
                .counterpart_of(&message.sender_id)
                .cloned()
                .ok_or_else(|| CourierlinkError::NotParticipant(conversation.id.clone()))?;

            // Quota check and increment happen under one lock, like the
            // store's immediate transaction.
            let usage = if conversation.business_id == message.sender_id {
                state.businesses.get_mut(&message.sender_id)
            } else {
                None
            };
            if let Some(record) = &usage {
                let status = plan_status(record);
                if !evaluate_messages(&status).permits_send() {
                    return Err(CourierlinkError::QuotaExhausted {
                        tier: status.plan,
                        limit: status.daily_message_limit,
                    });
                }
            }

            let stored = Message {
                id: MessageId(uuid::Uuid::new_v4().to_string()),
                conversation_id: message.conversation_id.clone(),
                sender_id: message.sender_id.clone(),
                content: message.content.clone(),
                is_read: false,
                created_at: now(),
            };
            conversation.updated_at = stored.created_at.clone();
            if let Some(record) = usage {
                record.messages_sent_today += 1;
            }
            state.messages.push(stored.clone());
            (stored, recipient_id)
        };
        self.publish(ChangeEvent::MessageInserted {
            message: stored.clone(),
            recipient_id,
        });
        Ok(stored)
    }

    async fn list_messages(
        &self,
        conversation: &ConversationId,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, CourierlinkError> {
        self.check_failing()?;
        let state = self.state.lock().await;
        let all: Vec<_> = state
            .messages
            .iter()
            .filter(|m| &m.conversation_id == conversation)
            .cloned()
            .collect();
        let skip = match limit {
            Some(limit) if limit >= 0 => all.len().saturating_sub(limit as usize),
            _ => 0,
        };
        Ok(all.into_iter().skip(skip).collect())
    }

    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
    ) -> Result<usize, CourierlinkError> {
        self.check_failing()?;
        let updated = {
            let mut state = self.state.lock().await;
            let mut updated = 0;
            for message in state.messages.iter_mut().filter(|m| {
                &m.conversation_id == conversation && &m.sender_id != reader && !m.is_read
            }) {
                message.is_read = true;
                updated += 1;
            }
            updated
        };
        if updated > 0 {
            self.publish(ChangeEvent::MessagesRead {
                conversation_id: conversation.clone(),
                reader_id: reader.clone(),
            });
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> ConversationPair {
        ConversationPair::new(UserId::from("biz"), UserId::from("cou"))
    }

    #[tokio::test]
    async fn duplicate_pair_collides() {
        let store = MockStore::new();
        store.insert_conversation(&pair()).await.unwrap();
        let err = store.insert_conversation(&pair()).await.unwrap_err();
        assert!(matches!(err, CourierlinkError::ConstraintCollision { .. }));
        assert_eq!(store.conversation_count().await, 1);
    }

    #[tokio::test]
    async fn staged_race_hides_one_lookup() {
        let store = MockStore::new();
        store.stage_race(pair()).await;

        assert!(store.find_conversation_by_pair(&pair()).await.unwrap().is_none());
        assert_eq!(store.conversation_count().await, 1);
        assert!(store.find_conversation_by_pair(&pair()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn business_messages_move_usage() {
        let store = MockStore::new();
        store.add_business("biz", "Lezzet", PlanTier::Free).await;
        let conv = store.insert_conversation(&pair()).await.unwrap();

        for sender in ["biz", "cou"] {
            store
                .insert_message(&NewMessage {
                    conversation_id: conv.id.clone(),
                    sender_id: UserId::from(sender),
                    content: "selam".into(),
                })
                .await
                .unwrap();
        }
        let record = store
            .get_business_plan_status(&UserId::from("biz"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.messages_sent_today, 1);
    }

    #[tokio::test]
    async fn exhausted_business_insert_is_refused() {
        let store = MockStore::new();
        store.add_business("biz", "Lezzet", PlanTier::Free).await;
        store.set_messages_sent("biz", 2).await;
        let conv = store.insert_conversation(&pair()).await.unwrap();
        let new = |sender: &str| NewMessage {
            conversation_id: conv.id.clone(),
            sender_id: UserId::from(sender),
            content: "selam".into(),
        };

        let err = store.insert_message(&new("biz")).await.unwrap_err();
        assert!(matches!(
            err,
            CourierlinkError::QuotaExhausted {
                tier: PlanTier::Free,
                limit: 2
            }
        ));
        store.insert_message(&new("cou")).await.unwrap();
        assert_eq!(store.list_messages(&conv.id, None).await.unwrap().len(), 1);

        store.set_plan("biz", PlanTier::Standard).await;
        store.insert_message(&new("biz")).await.unwrap();
        let record = store
            .get_business_plan_status(&UserId::from("biz"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.messages_sent_today, 3);
    }

    #[tokio::test]
    async fn failing_store_returns_retryable_errors() {
        let store = MockStore::new();
        store.set_failing(true);
        let err = store.find_conversation_by_pair(&pair()).await.unwrap_err();
        assert!(err.is_retryable());
        assert!(matches!(
            store.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
    }
}
