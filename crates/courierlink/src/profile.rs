// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courierlink profile` subcommands.

use courierlink_core::{CourierlinkError, PlanTier, Profile, UserId};
use courierlink_storage::SqliteStorage;
use tracing::info;

/// Profile management actions.
#[derive(Debug, Clone)]
pub enum ProfileAction {
    CreateCourier { user: String, name: String },
    CreateBusiness { user: String, name: String },
    SetPlan { user: String, plan: PlanTier },
}

pub async fn run_profile(
    storage: &SqliteStorage,
    action: ProfileAction,
    json: bool,
) -> Result<(), CourierlinkError> {
    match action {
        ProfileAction::CreateCourier { user, name } => {
            let profile = storage.create_courier(&UserId(user), &name).await?;
            report_created(&profile, json);
        }
        ProfileAction::CreateBusiness { user, name } => {
            let profile = storage.create_business(&UserId(user), &name).await?;
            report_created(&profile, json);
        }
        ProfileAction::SetPlan { user, plan } => {
            let user = UserId(user);
            storage.set_business_plan(&user, plan).await?;
            info!(business = %user, %plan, "plan changed");
            if json {
                crate::print_json(&serde_json::json!({ "user_id": user, "plan": plan }));
            } else {
                println!("{user} is now on the {plan} plan");
            }
        }
    }
    Ok(())
}

fn report_created(profile: &Profile, json: bool) {
    if json {
        crate::print_json(profile);
    } else {
        println!(
            "created {} profile {} for {} ({})",
            profile.role, profile.id, profile.user_id, profile.display_name
        );
    }
}
