// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courierlink plans` command implementation.
//!
//! Prints the plan catalog the way the pricing page lists it.

use courierlink_core::PlanTier;
use courierlink_plans::{catalog, format_remaining};
use serde::Serialize;

/// One catalog row in `--json` mode.
#[derive(Debug, Serialize)]
pub struct PlanRow {
    pub tier: PlanTier,
    pub name: &'static str,
    pub price: u32,
    pub daily_message_limit: i64,
    pub daily_approval_limit: i64,
    /// Limit as displayed, with the unlimited sentinel rendered as a label.
    pub messages_display: String,
    pub can_receive_requests: bool,
    pub description: &'static str,
}

/// Catalog rows, cheapest first.
pub fn plan_rows() -> Vec<PlanRow> {
    catalog()
        .iter()
        .map(|plan| PlanRow {
            tier: plan.tier,
            name: plan.name,
            price: plan.price,
            daily_message_limit: plan.daily_message_limit,
            daily_approval_limit: plan.daily_approval_limit,
            messages_display: format_remaining(
                plan.daily_message_limit,
                plan.daily_message_limit,
            ),
            can_receive_requests: plan.can_receive_requests,
            description: plan.description,
        })
        .collect()
}

/// Run the `courierlink plans` command.
pub fn run_plans(json: bool, use_color: bool) {
    let rows = plan_rows();
    if json {
        crate::print_json(&rows);
        return;
    }

    println!();
    println!("  courierlink plans");
    println!("  {}", "-".repeat(60));
    for row in &rows {
        let inbound = if row.can_receive_requests { "yes" } else { "no" };
        let header = format!("{:<10} {:>4} TL/ay", row.name, row.price);
        if use_color {
            use colored::Colorize;
            println!("    {}", header.bold());
        } else {
            println!("    {header}");
        }
        println!(
            "      messages/day: {:<10} inbound requests: {inbound}",
            row.messages_display
        );
        println!("      {}", row.description);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_follow_catalog_order() {
        let tiers: Vec<_> = plan_rows().iter().map(|r| r.tier).collect();
        assert_eq!(tiers, PlanTier::ALL);
    }

    #[test]
    fn unlimited_tier_displays_label() {
        let rows = plan_rows();
        let premium = rows.iter().find(|r| r.tier == PlanTier::Premium).unwrap();
        assert_eq!(premium.messages_display, "Sınırsız");
        let free = rows.iter().find(|r| r.tier == PlanTier::Free).unwrap();
        assert_eq!(free.messages_display, "2 / 2");
    }

    #[test]
    fn json_rows_use_lowercase_tiers() {
        let json = serde_json::to_string(&plan_rows()).unwrap();
        assert!(json.contains("\"tier\":\"standard\""));
    }
}
