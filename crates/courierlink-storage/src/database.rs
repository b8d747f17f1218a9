// SPDX-FileCopyrightText: 2026 Courierlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use courierlink_core::CourierlinkError;
use tracing::{debug, info};

use crate::migrations;

/// Handle to the courierlink SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs and run
    /// pending migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, CourierlinkError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(CourierlinkError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(CourierlinkError::storage)?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        info!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests and dry runs.
    pub async fn open_in_memory() -> Result<Self, CourierlinkError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(CourierlinkError::storage)?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), CourierlinkError> {
        self.conn
            .call(move |conn| {
                if wal_mode {
                    let mode: String =
                        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
                            row.get(0)
                        })?;
                    debug!(%mode, "journal mode set");
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(migrations::run_migrations)
            .await
            .map_err(CourierlinkError::storage)?;
        debug!("migrations applied");
        Ok(())
    }

    /// The single writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL so the main database file is self-contained.
    pub async fn checkpoint(&self) -> Result<(), CourierlinkError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Checkpoint and close the connection.
    pub async fn close(self) -> Result<(), CourierlinkError> {
        self.checkpoint().await?;
        self.conn.close().await.map_err(CourierlinkError::storage)?;
        debug!("database closed");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the storage variant.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> CourierlinkError {
    CourierlinkError::Storage {
        source: Box::new(e),
    }
}
