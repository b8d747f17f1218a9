// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD operations.

use courierlink_core::{Conversation, ConversationId, ConversationPair, CourierlinkError, UserId};
use rusqlite::{ErrorCode, params};
use tracing::debug;

use super::now_iso;
use crate::database::{Database, map_tr_err};

fn row_to_conversation(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        business_id: UserId(row.get(1)?),
        courier_id: UserId(row.get(2)?),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Exact `(business_id, courier_id)` lookup.
pub async fn find_by_pair(
    db: &Database,
    pair: &ConversationPair,
) -> Result<Option<Conversation>, CourierlinkError> {
    let business_id = pair.business_id.0.clone();
    let courier_id = pair.courier_id.0.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, business_id, courier_id, created_at, updated_at
                 FROM conversations WHERE business_id = ?1 AND courier_id = ?2",
                params![business_id, courier_id],
                row_to_conversation,
            );
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a conversation for `pair`.
///
/// A unique-constraint violation surfaces as
/// [`CourierlinkError::ConstraintCollision`]; any other failure is a
/// storage error.
pub async fn insert(
    db: &Database,
    pair: &ConversationPair,
) -> Result<Conversation, CourierlinkError> {
    let now = now_iso();
    let conversation = Conversation {
        id: ConversationId(uuid::Uuid::new_v4().to_string()),
        business_id: pair.business_id.clone(),
        courier_id: pair.courier_id.clone(),
        created_at: now.clone(),
        updated_at: now,
    };

    let row = conversation.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO conversations (id, business_id, courier_id, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    row.id.0,
                    row.business_id.0,
                    row.courier_id.0,
                    row.created_at,
                    row.updated_at,
                ],
            );
            match result {
                Ok(_) => Ok(true),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(false)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)?;

    if !inserted {
        debug!(
            business_id = %pair.business_id,
            courier_id = %pair.courier_id,
            "conversation insert collided with an existing pair"
        );
        return Err(CourierlinkError::ConstraintCollision {
            business_id: pair.business_id.clone(),
            courier_id: pair.courier_id.clone(),
        });
    }
    Ok(conversation)
}

/// Get a conversation by ID.
pub async fn get(
    db: &Database,
    id: &ConversationId,
) -> Result<Option<Conversation>, CourierlinkError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT id, business_id, courier_id, created_at, updated_at
                 FROM conversations WHERE id = ?1",
                params![id],
                row_to_conversation,
            );
            match result {
                Ok(conversation) => Ok(Some(conversation)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Conversations `user` participates in, most recently active first.
pub async fn list_for_user(
    db: &Database,
    user: &UserId,
) -> Result<Vec<Conversation>, CourierlinkError> {
    let user = user.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, business_id, courier_id, created_at, updated_at
                 FROM conversations WHERE business_id = ?1 OR courier_id = ?1
                 ORDER BY updated_at DESC",
            )?;
            let rows = stmt.query_map(params![user], row_to_conversation)?;
            let mut conversations = Vec::new();
            for row in rows {
                conversations.push(row?);
            }
            Ok(conversations)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(business: &str, courier: &str) -> ConversationPair {
        ConversationPair::new(UserId::from(business), UserId::from(courier))
    }

    #[tokio::test]
    async fn insert_then_find_by_pair() {
        let db = Database::open_in_memory().await.unwrap();
        let created = insert(&db, &pair("biz", "cou")).await.unwrap();

        let found = find_by_pair(&db, &pair("biz", "cou")).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(find_by_pair(&db, &pair("cou", "biz")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_pair_is_a_collision() {
        let db = Database::open_in_memory().await.unwrap();
        insert(&db, &pair("biz", "cou")).await.unwrap();

        let err = insert(&db, &pair("biz", "cou")).await.unwrap_err();
        assert!(matches!(err, CourierlinkError::ConstraintCollision { .. }));
    }

    #[tokio::test]
    async fn list_returns_both_sides() {
        let db = Database::open_in_memory().await.unwrap();
        insert(&db, &pair("biz", "cou-1")).await.unwrap();
        insert(&db, &pair("biz", "cou-2")).await.unwrap();
        insert(&db, &pair("other", "cou-1")).await.unwrap();

        assert_eq!(list_for_user(&db, &UserId::from("biz")).await.unwrap().len(), 2);
        assert_eq!(list_for_user(&db, &UserId::from("cou-1")).await.unwrap().len(), 2);
        assert!(list_for_user(&db, &UserId::from("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        let db = Database::open_in_memory().await.unwrap();
        assert!(get(&db, &ConversationId::from("missing")).await.unwrap().is_none());
    }
}
