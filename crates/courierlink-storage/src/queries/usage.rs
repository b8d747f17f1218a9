// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business plan rows and daily usage counters.
//!
//! Counters roll over on a rolling 24 hour boundary measured from
//! `last_usage_reset`, not at calendar midnight.

use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use courierlink_core::{BusinessRecord, CourierlinkError, PlanTier, UserId};
use rusqlite::params;
use rusqlite::types::Type;
use tracing::{debug, info};

use super::to_iso;
use crate::database::{Database, map_tr_err};

/// Length of one usage window.
pub const USAGE_WINDOW_HOURS: i64 = 24;

const RESET_SQL: &str = "UPDATE businesses
     SET messages_sent_today = 0, approvals_today = 0, last_usage_reset = ?1
     WHERE last_usage_reset <= ?2";

fn window_start(now: DateTime<Utc>) -> String {
    to_iso(now - Duration::hours(USAGE_WINDOW_HOURS))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<BusinessRecord> {
    let plan: String = row.get(3)?;
    let plan = PlanTier::from_str(&plan)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    Ok(BusinessRecord {
        id: row.get(0)?,
        user_id: UserId(row.get(1)?),
        business_name: row.get(2)?,
        plan,
        messages_sent_today: row.get(4)?,
        approvals_today: row.get(5)?,
        last_usage_reset: row.get(6)?,
        plan_updated_at: row.get(7)?,
    })
}

/// Roll over and read the business row owned by `user` inside `tx`.
pub(crate) fn read_business_tx(
    tx: &rusqlite::Transaction<'_>,
    user: &str,
    now: DateTime<Utc>,
) -> rusqlite::Result<Option<BusinessRecord>> {
    let rolled = tx.execute(
        &format!("{RESET_SQL} AND user_id = ?3"),
        params![to_iso(now), window_start(now), user],
    )?;
    if rolled > 0 {
        debug!(user_id = %user, "usage window expired, counters rolled over");
    }
    let result = tx.query_row(
        "SELECT id, user_id, business_name, plan, messages_sent_today, approvals_today,
                last_usage_reset, plan_updated_at
         FROM businesses WHERE user_id = ?1",
        params![user],
        row_to_record,
    );
    match result {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// The business row owned by `user`, rolled over first if its window expired.
pub async fn get_business_record(
    db: &Database,
    user: &UserId,
    now: DateTime<Utc>,
) -> Result<Option<BusinessRecord>, CourierlinkError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let record = read_business_tx(&tx, &user, now)?;
            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)
}

/// Roll over every business whose usage window has expired.
///
/// Returns the number of businesses reset.
pub async fn reset_stale_usage(db: &Database, now: DateTime<Utc>) -> Result<usize, CourierlinkError> {
    let now_str = to_iso(now);
    let cutoff = window_start(now);
    let reset = db
        .connection()
        .call(move |conn| conn.execute(RESET_SQL, params![now_str, cutoff]))
        .await
        .map_err(map_tr_err)?;
    info!(reset, "stale usage counters reset");
    Ok(reset)
}

/// Count one approval against the business owned by `user`.
pub async fn record_approval(db: &Database, user: &UserId) -> Result<(), CourierlinkError> {
    let user_id = user.0.clone();
    let updated = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE businesses SET approvals_today = approvals_today + 1 WHERE user_id = ?1",
                params![user_id],
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
    Ok(())
}
