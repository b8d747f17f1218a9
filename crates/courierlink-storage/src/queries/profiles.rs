// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Courier and business profile operations.

use courierlink_core::{CourierlinkError, PlanTier, Profile, Role, UserId};
use rusqlite::params;
use tracing::info;

use super::now_iso;
use crate::database::{Database, map_tr_err};

/// Create the courier profile owned by `user`.
pub async fn create_courier(
    db: &Database,
    user: &UserId,
    full_name: &str,
) -> Result<Profile, CourierlinkError> {
    let profile = Profile {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.clone(),
        role: Role::Courier,
        display_name: full_name.to_string(),
        created_at: now_iso(),
    };
    let row = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO couriers (id, user_id, full_name, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![row.id, row.user_id.0, row.display_name, row.created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    info!(user_id = %user, "courier profile created");
    Ok(profile)
}

/// Create the business profile owned by `user`, on the free plan.
pub async fn create_business(
    db: &Database,
    user: &UserId,
    business_name: &str,
) -> Result<Profile, CourierlinkError> {
    let now = now_iso();
    let profile = Profile {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user.clone(),
        role: Role::Business,
        display_name: business_name.to_string(),
        created_at: now.clone(),
    };
    let row = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO businesses (id, user_id, business_name, plan, last_usage_reset,
                                         plan_updated_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?5)",
                params![
                    row.id,
                    row.user_id.0,
                    row.display_name,
                    PlanTier::default().to_string(),
                    now,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    info!(user_id = %user, "business profile created");
    Ok(profile)
}

/// The profile of `role` owned by `user`.
pub async fn find(
    db: &Database,
    user: &UserId,
    role: Role,
) -> Result<Option<Profile>, CourierlinkError> {
    let sql = match role {
        Role::Courier => "SELECT id, user_id, full_name, created_at FROM couriers WHERE user_id = ?1",
        Role::Business => {
            "SELECT id, user_id, business_name, created_at FROM businesses WHERE user_id = ?1"
        }
    };
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(sql, params![user], |row| {
                Ok(Profile {
                    id: row.get(0)?,
                    user_id: UserId(row.get(1)?),
                    role,
                    display_name: row.get(2)?,
                    created_at: row.get(3)?,
                })
            });
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Move a business to `plan`. Usage counters are left as they are.
pub async fn set_business_plan(
    db: &Database,
    user: &UserId,
    plan: PlanTier,
) -> Result<(), CourierlinkError> {
    let user_id = user.0.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE businesses SET plan = ?2, plan_updated_at = ?3 WHERE user_id = ?1",
                params![user_id, plan.to_string(), now_iso()],
            )
        })
        .await
        .map_err(map_tr_err)?;

    if updated == 0 {
        return Err(CourierlinkError::NotFound {
            entity: "business",
            id: user.to_string(),
        });
    }
    info!(user_id = %user, %plan, "business plan changed");
    Ok(())
}
