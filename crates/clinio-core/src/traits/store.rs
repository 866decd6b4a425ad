// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation store trait: a key-value store with sliding TTL.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ClinioError;
use crate::types::Conversation;

/// Persistence for conversations, keyed by user id.
///
/// Records expire after a TTL that slides on every access; an expired
/// record is indistinguishable from an absent one.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Fetch a conversation, refreshing its TTL. Returns `None` when the
    /// record is absent or has expired.
    async fn get(&self, user_id: &str) -> Result<Option<Conversation>, ClinioError>;

    /// Persist a conversation with the given TTL.
    async fn save(
        &self,
        conversation: &Conversation,
        ttl: Duration,
    ) -> Result<(), ClinioError>;

    /// Remove a conversation. Returns `true` when a record was deleted.
    async fn delete(&self, user_id: &str) -> Result<bool, ClinioError>;

    /// Push a conversation's expiry forward without rewriting it.
    async fn extend_ttl(&self, user_id: &str, ttl: Duration) -> Result<(), ClinioError>;

    /// User ids of all conversations that have not expired.
    async fn list_active_ids(&self) -> Result<Vec<String>, ClinioError>;
}
