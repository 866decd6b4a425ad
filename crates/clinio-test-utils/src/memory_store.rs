// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation store with real TTL semantics.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use clinio_core::types::Conversation;
use clinio_core::{ClinioError, ConversationStore};

/// HashMap-backed store mirroring the SQLite adapter's expiry behavior:
/// expired entries are reported absent, reads slide the expiry forward.
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, (Conversation, DateTime<Utc>)>>>,
    default_ttl: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_default_ttl(Duration::from_secs(3600))
    }

    pub fn with_default_ttl(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Force-expire a conversation, as if its TTL had elapsed.
    pub async fn expire(&self, user_id: &str) {
        if let Some(entry) = self.inner.lock().await.get_mut(user_id) {
            entry.1 = Utc::now() - chrono::Duration::seconds(1);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<Conversation>, ClinioError> {
        let mut inner = self.inner.lock().await;
        let now = Utc::now();
        match inner.get_mut(user_id) {
            None => Ok(None),
            Some((_, expires_at)) if *expires_at <= now => {
                inner.remove(user_id);
                Ok(None)
            }
            Some((conversation, expires_at)) => {
                *expires_at = now
                    + chrono::Duration::from_std(self.default_ttl)
                        .unwrap_or_else(|_| chrono::Duration::seconds(3600));
                Ok(Some(conversation.clone()))
            }
        }
    }

    async fn save(
        &self,
        conversation: &Conversation,
        ttl: Duration,
    ) -> Result<(), ClinioError> {
        let expires_at = Utc::now()
            + chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::seconds(3600));
        self.inner
            .lock()
            .await
            .insert(conversation.user_id.clone(), (conversation.clone(), expires_at));
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<bool, ClinioError> {
        Ok(self.inner.lock().await.remove(user_id).is_some())
    }

    async fn extend_ttl(&self, user_id: &str, ttl: Duration) -> Result<(), ClinioError> {
        if let Some(entry) = self.inner.lock().await.get_mut(user_id) {
            entry.1 = Utc::now()
                + chrono::Duration::from_std(ttl)
                    .unwrap_or_else(|_| chrono::Duration::seconds(3600));
        }
        Ok(())
    }

    async fn list_active_ids(&self) -> Result<Vec<String>, ClinioError> {
        let now = Utc::now();
        Ok(self
            .inner
            .lock()
            .await
            .iter()
            .filter(|(_, (_, expires_at))| *expires_at > now)
            .map(|(id, _)| id.clone())
            .collect())
    }
}
