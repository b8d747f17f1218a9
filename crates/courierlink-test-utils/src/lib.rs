// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for courierlink integration tests.
//!
//! Provides substitutable collaborators and a SQLite-backed harness for
//! fast, deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockStore`] - In-memory `MatchStore` with race staging and failure injection
//! - [`MockSession`] - Session collaborator with a switchable identity
//! - [`TestHarness`] - Temp-dir SQLite store with an attached event bus

pub mod harness;
pub mod mock_session;
pub mod mock_store;

pub use harness::TestHarness;
pub use mock_session::MockSession;
pub use mock_store::MockStore;
