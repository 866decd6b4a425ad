// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text generator for deterministic testing.
//!
//! `MockGenerator` implements `TextGenerator` with pre-configured responses,
//! enabling fast, CI-runnable tests without a model endpoint.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use clinio_core::{ClinioError, TextGenerator};

/// A mock generator that returns pre-configured completions.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default completion is returned. `set_failing(true)` makes every call
/// error, for exercising the degradation path.
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<String>>>,
    failing: AtomicBool,
}

impl MockGenerator {
    /// Create a mock generator with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            failing: AtomicBool::new(false),
        }
    }

    /// Create a mock generator pre-loaded with the given responses.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(responses))),
            failing: AtomicBool::new(false),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Make subsequent calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn complete(
        &self,
        _prompt: &str,
        _max_tokens: u32,
        _temperature: f32,
    ) -> Result<String, ClinioError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ClinioError::Generation {
                message: "mock generator configured to fail".to_string(),
                source: None,
            });
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| "Estoy aquí para ayudarte con tus citas.".to_string()))
    }

    async fn health_check(&self) -> bool {
        !self.failing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queued_responses_returned_in_order() {
        let generator = MockGenerator::with_responses(vec![
            "primera".to_string(),
            "segunda".to_string(),
        ]);
        assert_eq!(generator.complete("p", 10, 0.7).await.unwrap(), "primera");
        assert_eq!(generator.complete("p", 10, 0.7).await.unwrap(), "segunda");
        // Queue exhausted, falls back to the default.
        assert_eq!(
            generator.complete("p", 10, 0.7).await.unwrap(),
            "Estoy aquí para ayudarte con tus citas."
        );
    }

    #[tokio::test]
    async fn failing_mode_errors() {
        let generator = MockGenerator::new();
        generator.set_failing(true);
        assert!(generator.complete("p", 10, 0.7).await.is_err());
        assert!(!generator.health_check().await);
    }
}
