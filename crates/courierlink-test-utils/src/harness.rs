// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness backed by a real SQLite store.
//!
//! `TestHarness` opens a temp-dir database with an attached event bus and
//! seeds courier and business profiles, so integration tests run against
//! the same schema, triggers and constraints as production.

use std::sync::Arc;

use courierlink_bus::EventBus;
use courierlink_config::model::{CourierlinkConfig, StorageConfig};
use courierlink_core::{CourierlinkError, PlanTier, UserId};
use courierlink_storage::SqliteStorage;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    couriers: Vec<(String, String)>,
    businesses: Vec<(String, String, PlanTier)>,
    config: CourierlinkConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            couriers: Vec::new(),
            businesses: Vec::new(),
            config: CourierlinkConfig::default(),
        }
    }

    /// Seed a courier profile.
    pub fn with_courier(mut self, user: &str, full_name: &str) -> Self {
        self.couriers.push((user.to_string(), full_name.to_string()));
        self
    }

    /// Seed a business profile on `plan`.
    pub fn with_business(mut self, user: &str, name: &str, plan: PlanTier) -> Self {
        self.businesses
            .push((user.to_string(), name.to_string(), plan));
        self
    }

    /// Enforce the inbound-request policy of business plans.
    pub fn enforcing_inbound_requests(mut self) -> Self {
        self.config.gate.enforce_inbound_requests = true;
        self
    }

    /// Build the harness, opening the database and seeding profiles.
    pub async fn build(self) -> Result<TestHarness, CourierlinkError> {
        let temp_dir = tempfile::TempDir::new().map_err(CourierlinkError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let bus = Arc::new(EventBus::new(config.realtime.channel_capacity));
        let storage = SqliteStorage::new(config.storage.clone()).with_event_bus(bus.clone());
        storage.initialize().await?;

        for (user, name) in &self.couriers {
            storage.create_courier(&UserId::from(user.as_str()), name).await?;
        }
        for (user, name, plan) in &self.businesses {
            let user = UserId::from(user.as_str());
            storage.create_business(&user, name).await?;
            if *plan != PlanTier::Free {
                storage.set_business_plan(&user, *plan).await?;
            }
        }

        Ok(TestHarness {
            storage: Arc::new(storage),
            bus,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A seeded SQLite store plus the bus it publishes to.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub bus: Arc<EventBus>,
    pub config: CourierlinkConfig,
    // Keeps the database directory alive for the harness lifetime.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }
}
