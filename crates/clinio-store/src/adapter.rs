// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`ConversationStore`] implementation over SQLite.
//!
//! Expiry is enforced on read: a row whose `expires_at` has passed is
//! deleted and reported absent, and every successful read slides the expiry
//! forward by the store's default TTL.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use tracing::{debug, warn};

use clinio_core::types::Conversation;
use clinio_core::{ClinioError, ConversationStore};

use crate::database::{map_tr_err, Database};

/// SQLite-backed conversation store with sliding TTL.
pub struct SqliteConversationStore {
    db: Database,
    default_ttl: Duration,
}

impl SqliteConversationStore {
    /// Open the store at `path`. `default_ttl` is the window applied when a
    /// read refreshes a record's expiry.
    pub async fn open(
        path: &str,
        wal_mode: bool,
        default_ttl: Duration,
    ) -> Result<Self, ClinioError> {
        let db = Database::open(path, wal_mode).await?;
        Ok(Self { db, default_ttl })
    }

    /// Close the underlying database.
    pub async fn close(self) -> Result<(), ClinioError> {
        self.db.close().await
    }

    /// Remove conversations whose last activity is older than `max_idle`.
    ///
    /// The TTL already handles routine expiry; this exists for explicit
    /// maintenance sweeps. Returns the number of conversations removed.
    pub async fn sweep_idle(&self, max_idle: Duration) -> Result<usize, ClinioError> {
        let cutoff = Utc::now().timestamp() - max_idle.as_secs() as i64;
        let removed = self
            .db
            .connection()
            .call(move |conn| {
                let n = conn.execute(
                    "DELETE FROM conversations WHERE updated_at < ?1",
                    params![cutoff],
                )?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;
        if removed > 0 {
            debug!(removed, "idle conversations swept");
        }
        Ok(removed)
    }

    /// Number of unexpired conversations.
    pub async fn active_count(&self) -> Result<usize, ClinioError> {
        Ok(self.list_active_ids().await?.len())
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn get(&self, user_id: &str) -> Result<Option<Conversation>, ClinioError> {
        let user_id = user_id.to_string();
        let now = Utc::now().timestamp();
        let refresh_to = now + self.default_ttl.as_secs() as i64;

        let payload: Option<String> = self
            .db
            .connection()
            .call(move |conn| {
                let row: Option<(String, i64)> = conn
                    .query_row(
                        "SELECT payload, expires_at FROM conversations WHERE user_id = ?1",
                        params![user_id],
                        |row| Ok((row.get(0)?, row.get(1)?)),
                    )
                    .map(Some)
                    .or_else(|e| match e {
                        rusqlite::Error::QueryReturnedNoRows => Ok(None),
                        other => Err(other),
                    })?;

                match row {
                    None => Ok(None),
                    Some((_, expires_at)) if expires_at <= now => {
                        // Expired records are indistinguishable from absent ones.
                        conn.execute(
                            "DELETE FROM conversations WHERE user_id = ?1",
                            params![user_id],
                        )?;
                        Ok(None)
                    }
                    Some((payload, _)) => {
                        // Sliding expiration: every read pushes expiry forward.
                        conn.execute(
                            "UPDATE conversations SET expires_at = ?1 WHERE user_id = ?2",
                            params![refresh_to, user_id],
                        )?;
                        Ok(Some(payload))
                    }
                }
            })
            .await
            .map_err(map_tr_err)?;

        match payload {
            None => Ok(None),
            Some(json) => match serde_json::from_str(&json) {
                Ok(conversation) => Ok(Some(conversation)),
                Err(e) => {
                    warn!(error = %e, "corrupt conversation payload, treating as absent");
                    Ok(None)
                }
            },
        }
    }

    async fn save(
        &self,
        conversation: &Conversation,
        ttl: Duration,
    ) -> Result<(), ClinioError> {
        let user_id = conversation.user_id.clone();
        let payload = serde_json::to_string(conversation)
            .map_err(|e| ClinioError::Store { source: Box::new(e) })?;
        let updated_at = conversation.updated_at.timestamp();
        let expires_at = Utc::now().timestamp() + ttl.as_secs() as i64;

        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO conversations (user_id, payload, updated_at, expires_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (user_id) DO UPDATE SET
                         payload = excluded.payload,
                         updated_at = excluded.updated_at,
                         expires_at = excluded.expires_at",
                    params![user_id, payload, updated_at, expires_at],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn delete(&self, user_id: &str) -> Result<bool, ClinioError> {
        let user_id = user_id.to_string();
        let changed = self
            .db
            .connection()
            .call(move |conn| {
                let n = conn.execute(
                    "DELETE FROM conversations WHERE user_id = ?1",
                    params![user_id],
                )?;
                Ok(n)
            })
            .await
            .map_err(map_tr_err)?;
        Ok(changed > 0)
    }

    async fn extend_ttl(&self, user_id: &str, ttl: Duration) -> Result<(), ClinioError> {
        let user_id = user_id.to_string();
        let expires_at = Utc::now().timestamp() + ttl.as_secs() as i64;
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "UPDATE conversations SET expires_at = ?1 WHERE user_id = ?2",
                    params![expires_at, user_id],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    async fn list_active_ids(&self) -> Result<Vec<String>, ClinioError> {
        let now = Utc::now().timestamp();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id FROM conversations WHERE expires_at > ?1
                     ORDER BY updated_at DESC",
                )?;
                let rows = stmt.query_map(params![now], |row| row.get(0))?;
                let mut ids = Vec::new();
                for row in rows {
                    ids.push(row?);
                }
                Ok(ids)
            })
            .await
            .map_err(map_tr_err)
    }
}
