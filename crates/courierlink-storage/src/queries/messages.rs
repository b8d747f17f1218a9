// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message CRUD operations.

use chrono::Utc;
use courierlink_core::{ConversationId, CourierlinkError, Message, MessageId, NewMessage, UserId};
use courierlink_plans::gate::evaluate_messages;
use courierlink_plans::plan_status;
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use tracing::debug;

use super::{to_iso, usage};
use crate::database::{Database, map_tr_err};

fn row_to_message(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: MessageId(row.get(0)?),
        conversation_id: ConversationId(row.get(1)?),
        sender_id: UserId(row.get(2)?),
        content: row.get(3)?,
        is_read: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Insert a new message.
///
/// A business sender's daily quota is checked and consumed in the same
/// immediate transaction as the insert, so concurrent senders cannot
/// overrun it. The schema's triggers bump the conversation's `updated_at`
/// and, for a business sender, its `messages_sent_today`.
pub async fn insert(db: &Database, new: &NewMessage) -> Result<Message, CourierlinkError> {
    let now = Utc::now();
    let message = Message {
        id: MessageId(uuid::Uuid::new_v4().to_string()),
        conversation_id: new.conversation_id.clone(),
        sender_id: new.sender_id.clone(),
        content: new.content.clone(),
        is_read: false,
        created_at: to_iso(now),
    };

    let row = message.clone();
    let refused = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let business: Option<String> = tx
                .query_row(
                    "SELECT business_id FROM conversations WHERE id = ?1",
                    params![row.conversation_id.0],
                    |r| r.get(0),
                )
                .optional()?;

            if business.as_deref() == Some(row.sender_id.0.as_str()) {
                if let Some(record) = usage::read_business_tx(&tx, &row.sender_id.0, now)? {
                    let status = plan_status(&record);
                    if !evaluate_messages(&status).permits_send() {
                        return Ok(Some((status.plan, status.daily_message_limit)));
                    }
                }
            }

            tx.execute(
                "INSERT INTO messages (id, conversation_id, sender_id, content, is_read, created_at)
                 VALUES (?1, ?2, ?3, ?4, 0, ?5)",
                params![
                    row.id.0,
                    row.conversation_id.0,
                    row.sender_id.0,
                    row.content,
                    row.created_at,
                ],
            )?;
            tx.commit()?;
            Ok(None)
        })
        .await
        .map_err(map_tr_err)?;

    if let Some((tier, limit)) = refused {
        debug!(sender_id = %message.sender_id, %tier, "insert refused, daily message quota used up");
        return Err(CourierlinkError::QuotaExhausted { tier, limit });
    }
    Ok(message)
}

/// Messages of a conversation, oldest first.
///
/// With a `limit`, the most recent `limit` messages are returned, still in
/// chronological order.
pub async fn list(
    db: &Database,
    conversation: &ConversationId,
    limit: Option<i64>,
) -> Result<Vec<Message>, CourierlinkError> {
    let conversation = conversation.0.clone();
    // SQLite treats a negative LIMIT as unbounded.
    let limit = limit.unwrap_or(-1);
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, conversation_id, sender_id, content, is_read, created_at FROM (
                     SELECT rowid AS seq, id, conversation_id, sender_id, content, is_read, created_at
                     FROM messages WHERE conversation_id = ?1
                     ORDER BY created_at DESC, seq DESC LIMIT ?2
                 ) ORDER BY created_at ASC, seq ASC",
            )?;
            let rows = stmt.query_map(params![conversation, limit], row_to_message)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark every unread message not sent by `reader` as read.
pub async fn mark_read(
    db: &Database,
    conversation: &ConversationId,
    reader: &UserId,
) -> Result<usize, CourierlinkError> {
    let conversation = conversation.0.clone();
    let reader = reader.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE messages SET is_read = 1
                 WHERE conversation_id = ?1 AND sender_id != ?2 AND is_read = 0",
                params![conversation, reader],
            )
        })
        .await
        .map_err(map_tr_err)
}
