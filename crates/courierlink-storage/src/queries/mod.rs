// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod conversations;
pub mod messages;
pub mod profiles;
pub mod usage;

use chrono::{DateTime, SecondsFormat, Utc};

/// Timestamp in the same shape SQLite's column defaults produce.
pub(crate) fn to_iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn now_iso() -> String {
    to_iso(Utc::now())
}
