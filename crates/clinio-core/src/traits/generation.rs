// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text-generation trait: the black-box completion capability.

use async_trait::async_trait;

use crate::error::ClinioError;

/// A stateless request/response completion capability.
///
/// The orchestrator hands over one fully assembled prompt and receives raw
/// model text; sanitation and validation happen on the caller's side.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate one completion for the prompt, bounded by a token budget.
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ClinioError>;

    /// Whether the generation endpoint currently responds.
    async fn health_check(&self) -> bool;
}
