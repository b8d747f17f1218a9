// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the quota core.
//!
//! Authentication, storage, and realtime delivery live outside the core.
//! Each is reached through one narrow trait so tests can substitute fakes.

pub mod feed;
pub mod session;
pub mod store;

pub use feed::{ChangeFeed, Subscription};
pub use session::SessionProvider;
pub use store::MatchStore;
