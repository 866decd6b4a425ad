// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and schema.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use clinio_core::ClinioError;
use tracing::debug;

/// SQL schema for the conversation store. One row per user id; the whole
/// conversation travels as a JSON payload, Redis-style, with an absolute
/// expiry instant alongside.
const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS conversations (
        user_id    TEXT PRIMARY KEY,
        payload    TEXT NOT NULL,
        updated_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_conversations_expires_at
        ON conversations (expires_at);
";

/// An open SQLite database with the conversation schema applied.
pub struct Database {
    connection: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` and apply the schema.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, ClinioError> {
        let connection = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(map_sqlite_err)?;

        connection
            .call(move |conn| {
                if wal_mode {
                    conn.pragma_update(None, "journal_mode", "WAL")?;
                }
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        debug!(path, wal_mode, "conversation database opened");

        Ok(Self { connection })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.connection
    }

    /// Close the database, flushing pending writes.
    pub async fn close(self) -> Result<(), ClinioError> {
        self.connection.close().await.map_err(map_tr_err)
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub fn map_tr_err(err: tokio_rusqlite::Error) -> ClinioError {
    ClinioError::Store {
        source: Box::new(err),
    }
}

/// Map a rusqlite error into the workspace error type.
pub fn map_sqlite_err(err: rusqlite::Error) -> ClinioError {
    ClinioError::Store {
        source: Box::new(err),
    }
}
