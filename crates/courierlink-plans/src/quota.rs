// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unlimited-sentinel handling and quota display.

/// Any limit at or above this value means "no practical limit".
pub const UNLIMITED: i64 = 999_999;

/// Label rendered in place of counts for unlimited plans.
pub const UNLIMITED_LABEL: &str = "Sınırsız";

/// Whether `limit` is the unlimited sentinel. Defined for every input.
pub fn is_unlimited(limit: i64) -> bool {
    limit >= UNLIMITED
}

/// Render a `remaining / total` pair for display.
///
/// Values are printed as given. Callers pass non-negative inputs.
pub fn format_remaining(remaining: i64, total: i64) -> String {
    if is_unlimited(total) {
        UNLIMITED_LABEL.to_string()
    } else {
        format!("{remaining} / {total}")
    }
}

/// Derived `*_left` value for a counter: `limit - used`, never below zero.
///
/// Unlimited limits report the limit itself so the sentinel survives.
pub fn remaining(limit: i64, used: i64) -> i64 {
    if is_unlimited(limit) {
        limit
    } else {
        limit.saturating_sub(used).max(0)
    }
}
