// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the MatchStore trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use courierlink_bus::EventBus;
use courierlink_config::model::StorageConfig;
use courierlink_core::{
    BusinessRecord, ChangeEvent, Conversation, ConversationId, ConversationPair,
    CourierlinkError, HealthStatus, MatchStore, Message, NewMessage, PlanTier, Profile, Role,
    UserId,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed store.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened by [`SqliteStorage::initialize`].
/// When an [`EventBus`] is attached, successful inserts are published as
/// change events.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
    events: Option<Arc<EventBus>>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`](Self::initialize) is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
            events: None,
        }
    }

    /// Publish row changes to `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    /// Open the database at the configured path and run migrations.
    pub async fn initialize(&self) -> Result<(), CourierlinkError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.install(db)?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    /// Use a private in-memory database instead of the configured path.
    pub async fn initialize_in_memory(&self) -> Result<(), CourierlinkError> {
        let db = Database::open_in_memory().await?;
        self.install(db)
    }

    fn install(&self, db: Database) -> Result<(), CourierlinkError> {
        self.db.set(db).map_err(|_| CourierlinkError::Storage {
            source: "storage already initialized".into(),
        })
    }

    /// Checkpoint the WAL. The connection closes when the storage is dropped.
    pub async fn close(&self) -> Result<(), CourierlinkError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, CourierlinkError> {
        self.db.get().ok_or_else(|| CourierlinkError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    fn publish(&self, event: ChangeEvent) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    // --- Profile management ---

    pub async fn create_courier(
        &self,
        user: &UserId,
        full_name: &str,
    ) -> Result<Profile, CourierlinkError> {
        queries::profiles::create_courier(self.db()?, user, full_name).await
    }

    pub async fn create_business(
        &self,
        user: &UserId,
        business_name: &str,
    ) -> Result<Profile, CourierlinkError> {
        queries::profiles::create_business(self.db()?, user, business_name).await
    }

    pub async fn set_business_plan(
        &self,
        user: &UserId,
        plan: PlanTier,
    ) -> Result<(), CourierlinkError> {
        queries::profiles::set_business_plan(self.db()?, user, plan).await
    }

    // --- Usage maintenance ---

    /// Roll over every business whose 24 hour window has passed at `now`.
    pub async fn reset_stale_usage(&self, now: DateTime<Utc>) -> Result<usize, CourierlinkError> {
        queries::usage::reset_stale_usage(self.db()?, now).await
    }

    pub async fn record_approval(&self, user: &UserId) -> Result<(), CourierlinkError> {
        queries::usage::record_approval(self.db()?, user).await
    }
}

#[async_trait]
impl MatchStore for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn health_check(&self) -> Result<HealthStatus, CourierlinkError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    // --- Conversation operations ---

    async fn find_conversation_by_pair(
        &self,
        pair: &ConversationPair,
    ) -> Result<Option<Conversation>, CourierlinkError> {
        queries::conversations::find_by_pair(self.db()?, pair).await
    }

    async fn insert_conversation(
        &self,
        pair: &ConversationPair,
    ) -> Result<Conversation, CourierlinkError> {
        let conversation = queries::conversations::insert(self.db()?, pair).await?;
        self.publish(ChangeEvent::ConversationCreated(conversation.clone()));
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        id: &ConversationId,
    ) -> Result<Option<Conversation>, CourierlinkError> {
        queries::conversations::get(self.db()?, id).await
    }

    async fn list_conversations(
        &self,
        user: &UserId,
    ) -> Result<Vec<Conversation>, CourierlinkError> {
        queries::conversations::list_for_user(self.db()?, user).await
    }

    // --- Plan and profile reads ---

    async fn get_business_plan_status(
        &self,
        user: &UserId,
    ) -> Result<Option<BusinessRecord>, CourierlinkError> {
        queries::usage::get_business_record(self.db()?, user, Utc::now()).await
    }

    async fn find_profile(
        &self,
        user: &UserId,
        role: Role,
    ) -> Result<Option<Profile>, CourierlinkError> {
        queries::profiles::find(self.db()?, user, role).await
    }

    // --- Message operations ---

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, CourierlinkError> {
        let db = self.db()?;
        let conversation = queries::conversations::get(db, &message.conversation_id)
            .await?
            .ok_or_else(|| CourierlinkError::NotFound {
                entity: "conversation",
                id: message.conversation_id.to_string(),
            })?;
        let recipient_id = conversation
            .counterpart_of(&message.sender_id)
            .cloned()
            .ok_or_else(|| CourierlinkError::NotParticipant(conversation.id.clone()))?;

        let stored = queries::messages::insert(db, message).await?;
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
        queries::messages::list(self.db()?, conversation, limit).await
    }

    async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: &UserId,
    ) -> Result<usize, CourierlinkError> {
        let updated = queries::messages::mark_read(self.db()?, conversation, reader).await?;
        if updated > 0 {
            self.publish(ChangeEvent::MessagesRead {
                conversation_id: conversation.clone(),
                reader_id: reader.clone(),
            });
        }
        Ok(updated)
    }
}
