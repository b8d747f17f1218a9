// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Send-attempt gating on the daily message quota.
//!
//! A decision is made per attempt from a fresh usage snapshot:
//!
//! | condition                       | state               | send |
//! |---------------------------------|---------------------|------|
//! | unlimited limit                 | `Allowed`           | yes  |
//! | more than 2 left                | `Allowed`           | yes  |
//! | nothing left                    | `BlockedExhausted`  | no   |
//! | 1 or 2 left                     | `WarnLow`           | yes  |
//!
//! Banner dismissal is a presentation concern layered on top and lives in
//! [`crate::notice`].

use courierlink_core::{BusinessPlanStatus, CourierlinkError};
use serde::Serialize;
use tracing::warn;

use crate::quota::is_unlimited;

/// At or below this many remaining messages the warning banner appears.
pub const WARN_THRESHOLD: i64 = 2;

/// Outcome of evaluating one send attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GateState {
    Allowed,
    WarnLow { remaining: i64 },
    BlockedExhausted,
}

impl GateState {
    /// Whether the underlying send may proceed.
    pub fn permits_send(&self) -> bool {
        !matches!(self, GateState::BlockedExhausted)
    }

    /// Whether the passive warning banner applies (before dismissal).
    pub fn warrants_banner(&self) -> bool {
        !matches!(self, GateState::Allowed)
    }
}

/// Decide the gate state from the remaining count and the plan's daily limit.
pub fn evaluate(messages_left: i64, daily_message_limit: i64) -> GateState {
    if is_unlimited(daily_message_limit) {
        GateState::Allowed
    } else if messages_left > WARN_THRESHOLD {
        GateState::Allowed
    } else if messages_left <= 0 {
        GateState::BlockedExhausted
    } else {
        GateState::WarnLow {
            remaining: messages_left,
        }
    }
}

/// Gate state for a business's message quota.
pub fn evaluate_messages(status: &BusinessPlanStatus) -> GateState {
    evaluate(status.messages_left, status.daily_message_limit)
}

/// Gate state for a business's approval quota.
pub fn evaluate_approvals(status: &BusinessPlanStatus) -> GateState {
    evaluate(status.approvals_left, status.daily_approval_limit)
}

/// Evaluate the message quota and refuse when it is exhausted.
pub fn require_message_quota(status: &BusinessPlanStatus) -> Result<GateState, CourierlinkError> {
    let state = evaluate_messages(status);
    match state {
        GateState::BlockedExhausted => Err(CourierlinkError::QuotaExhausted {
            tier: status.plan,
            limit: status.daily_message_limit,
        }),
        GateState::WarnLow { remaining } => {
            warn!(
                business = %status.user_id,
                plan = %status.plan,
                remaining,
                "business is close to its daily message limit"
            );
            Ok(state)
        }
        GateState::Allowed => Ok(state),
    }
}
