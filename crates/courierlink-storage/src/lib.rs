// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for courierlink.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for profiles,
//! plan usage, conversations, and messages. The schema owns the invariants
//! the gate relies on: one conversation per `(business, courier)` pair and
//! usage counters that move only when a business sends a message.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
