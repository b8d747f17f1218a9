// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courierlink status` command implementation.
//!
//! Shows a business's plan, today's usage, and the gate state the chat
//! composer would display for it.

use courierlink_core::{BusinessPlanStatus, CourierlinkError, MatchStore, UserId};
use courierlink_plans::gate::{GateState, evaluate_approvals, evaluate_messages};
use courierlink_plans::{Dismissal, WarningBanner, format_remaining, limits_of, plan_status};
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub status: BusinessPlanStatus,
    pub plan_name: &'static str,
    pub messages_display: String,
    pub approvals_display: String,
    pub message_gate: GateState,
    pub approval_gate: GateState,
    pub banner: Option<WarningBanner>,
}

impl StatusResponse {
    pub fn new(status: BusinessPlanStatus) -> Self {
        let message_gate = evaluate_messages(&status);
        Self {
            plan_name: limits_of(status.plan).name,
            messages_display: format_remaining(status.messages_left, status.daily_message_limit),
            approvals_display: format_remaining(
                status.approvals_left,
                status.daily_approval_limit,
            ),
            approval_gate: evaluate_approvals(&status),
            banner: WarningBanner::for_state(message_gate, &Dismissal::default()),
            message_gate,
            status,
        }
    }
}

/// Run the `courierlink status` command for `user`.
pub async fn run_status(
    store: &dyn MatchStore,
    user: &UserId,
    json: bool,
    use_color: bool,
) -> Result<(), CourierlinkError> {
    let record = store
        .get_business_plan_status(user)
        .await?
        .ok_or_else(|| CourierlinkError::NotFound {
            entity: "business",
            id: user.to_string(),
        })?;
    let response = StatusResponse::new(plan_status(&record));

    if json {
        crate::print_json(&response);
    } else {
        print_status(&response, use_color);
    }
    Ok(())
}

fn print_status(response: &StatusResponse, use_color: bool) {
    let status = &response.status;
    println!();
    println!("  courierlink status: {}", status.business_name);
    println!("  {}", "-".repeat(45));
    println!("    Plan:       {}", response.plan_name);
    println!("    Messages:   {}", response.messages_display);
    println!("    Approvals:  {}", response.approvals_display);
    println!("    Window:     since {}", status.last_usage_reset);

    if let Some(banner) = &response.banner {
        println!();
        if use_color {
            use colored::Colorize;
            let title = match response.message_gate {
                GateState::BlockedExhausted => banner.title.red(),
                _ => banner.title.yellow(),
            };
            println!("    {} {title}", "!".yellow());
        } else {
            println!("    [WARN] {}", banner.title);
        }
        println!("           {}", banner.body);
    }
    println!();
}
