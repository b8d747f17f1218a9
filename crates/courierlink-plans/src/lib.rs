// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plan limits and messaging quota rules for courierlink.
//!
//! This crate provides:
//! - **Catalog**: the fixed table of plan tiers and their daily limits
//! - **Quota**: the unlimited sentinel and remaining/total display formatting
//! - **Gate**: the allow / warn / block decision for a send attempt
//! - **Notice**: banner, modal, and error copy surfaced to end users
//!
//! Everything here is pure and synchronous. Reading usage counters is the
//! caller's job; see `courierlink-chat` for the orchestration.

pub mod catalog;
pub mod gate;
pub mod notice;
pub mod quota;
pub mod status;

pub use catalog::{PlanLimits, catalog, limits_of};
pub use gate::{GateState, WARN_THRESHOLD, evaluate};
pub use notice::{BlockingModal, Dismissal, Notice, WarningBanner};
pub use quota::{UNLIMITED, format_remaining, is_unlimited};
pub use status::plan_status;
