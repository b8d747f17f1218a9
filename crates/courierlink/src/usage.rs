// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage counter commands: `approve` and `reset-usage`.

use chrono::Utc;
use courierlink_core::{CourierlinkError, MatchStore, SessionProvider, UserId};
use courierlink_plans::gate::{GateState, evaluate_approvals};
use courierlink_plans::{format_remaining, plan_status};
use courierlink_storage::SqliteStorage;
use tracing::info;

use crate::Outcome;

/// Record one application approval for the `--as` business.
///
/// Refused without touching the counter when today's approvals are used up.
pub async fn run_approve(
    storage: &SqliteStorage,
    session: &dyn SessionProvider,
    json: bool,
) -> Result<Outcome, CourierlinkError> {
    let me: UserId = session
        .current_user()
        .await?
        .ok_or(CourierlinkError::Unauthenticated)?
        .user_id;
    let record = storage
        .get_business_plan_status(&me)
        .await?
        .ok_or_else(|| CourierlinkError::NotFound {
            entity: "business",
            id: me.to_string(),
        })?;
    let status = plan_status(&record);

    if evaluate_approvals(&status) == GateState::BlockedExhausted {
        if json {
            crate::print_json(&serde_json::json!({
                "approved": false,
                "approvals_left": 0,
                "daily_approval_limit": status.daily_approval_limit,
            }));
        } else {
            println!(
                "daily approval limit of {} reached on the {} plan",
                status.daily_approval_limit, status.plan
            );
        }
        return Ok(Outcome::Refused);
    }

    storage.record_approval(&me).await?;
    let left = courierlink_plans::quota::remaining(
        status.daily_approval_limit,
        status.approvals_today + 1,
    );
    if json {
        crate::print_json(&serde_json::json!({
            "approved": true,
            "approvals_left": left,
            "daily_approval_limit": status.daily_approval_limit,
        }));
    } else {
        println!(
            "approval recorded, {} left today",
            format_remaining(left, status.daily_approval_limit)
        );
    }
    Ok(Outcome::Done)
}

/// Roll over every business whose 24 hour window has passed.
pub async fn run_reset_usage(storage: &SqliteStorage, json: bool) -> Result<(), CourierlinkError> {
    let reset = storage.reset_stale_usage(Utc::now()).await?;
    info!(reset, "stale usage windows rolled over");
    if json {
        crate::print_json(&serde_json::json!({ "reset": reset }));
    } else {
        println!("{reset} business(es) reset");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courierlink_config::model::StorageConfig;
    use courierlink_core::PlanTier;
    use courierlink_test_utils::MockSession;

    async fn storage() -> SqliteStorage {
        let storage = SqliteStorage::new(StorageConfig::default());
        storage.initialize_in_memory().await.unwrap();
        storage
            .create_business(&UserId::from("biz"), "Lokanta")
            .await
            .unwrap();
        storage
    }

    #[tokio::test]
    async fn free_business_approves_twice() {
        let storage = storage().await;
        let session = MockSession::signed_in("biz");

        assert_eq!(run_approve(&storage, &session, true).await.unwrap(), Outcome::Done);
        assert_eq!(run_approve(&storage, &session, true).await.unwrap(), Outcome::Done);
        assert_eq!(run_approve(&storage, &session, true).await.unwrap(), Outcome::Refused);

        let record = storage
            .get_business_plan_status(&UserId::from("biz"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.approvals_today, 2);
    }

    #[tokio::test]
    async fn premium_business_is_not_limited() {
        let storage = storage().await;
        storage
            .set_business_plan(&UserId::from("biz"), PlanTier::Premium)
            .await
            .unwrap();
        let session = MockSession::signed_in("biz");
        for _ in 0..5 {
            assert_eq!(run_approve(&storage, &session, true).await.unwrap(), Outcome::Done);
        }
    }

    #[tokio::test]
    async fn couriers_cannot_approve() {
        let storage = storage().await;
        let err = run_approve(&storage, &MockSession::signed_in("cou"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, CourierlinkError::NotFound { entity: "business", .. }));
    }

    #[tokio::test]
    async fn fresh_windows_are_left_alone() {
        let storage = storage().await;
        run_reset_usage(&storage, true).await.unwrap();
        assert_eq!(storage.reset_stale_usage(Utc::now()).await.unwrap(), 0);
    }
}
