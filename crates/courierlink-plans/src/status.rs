// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derive a [`BusinessPlanStatus`] from a stored business row.

use courierlink_core::{BusinessPlanStatus, BusinessRecord};

use crate::catalog::limits_of;
use crate::quota::remaining;

/// Combine stored counters with catalog limits.
pub fn plan_status(record: &BusinessRecord) -> BusinessPlanStatus {
    let limits = limits_of(record.plan);
    BusinessPlanStatus {
        business_id: record.id.clone(),
        user_id: record.user_id.clone(),
        business_name: record.business_name.clone(),
        plan: record.plan,
        messages_sent_today: record.messages_sent_today,
        approvals_today: record.approvals_today,
        messages_left: remaining(limits.daily_message_limit, record.messages_sent_today),
        approvals_left: remaining(limits.daily_approval_limit, record.approvals_today),
        daily_message_limit: limits.daily_message_limit,
        daily_approval_limit: limits.daily_approval_limit,
        can_receive_requests: limits.can_receive_requests,
        last_usage_reset: record.last_usage_reset.clone(),
        plan_updated_at: record.plan_updated_at.clone(),
    }
}
