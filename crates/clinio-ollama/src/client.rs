// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an Ollama-compatible generation endpoint.
//!
//! Single-shot, non-streaming completion against `/api/generate`. The stop
//! sequences cut the model off before it fabricates the next conversation
//! turn; the response sanitizer handles whatever still slips through.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use clinio_core::{ClinioError, TextGenerator};

/// Stop sequences for the structured prompt format.
const STOP_SEQUENCES: &[&str] = &["<USER>:", "<ASSISTANT>:", "\n\n"];

/// Request body for `/api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Sampling options understood by the endpoint.
#[derive(Debug, Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    stop: Vec<String>,
}

/// Response body for a non-streaming `/api/generate` call.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Client for an Ollama-compatible generation server.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    /// Create a generator against `base_url`, requesting `model`.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, ClinioError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClinioError::Generation {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ClinioError> {
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                num_predict: max_tokens,
                temperature,
                stop: STOP_SEQUENCES.iter().map(|s| (*s).to_string()).collect(),
            },
        };

        debug!(model = self.model.as_str(), prompt_chars = prompt.len(), "generation request");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClinioError::Timeout {
                        duration: Duration::from_secs(0),
                    }
                } else {
                    ClinioError::Generation {
                        message: format!("generation request failed: {e}"),
                        source: Some(Box::new(e)),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = body.as_str(), "generation endpoint error");
            return Err(ClinioError::Generation {
                message: format!("generation endpoint returned {status}"),
                source: None,
            });
        }

        let parsed: GenerateResponse =
            response.json().await.map_err(|e| ClinioError::Generation {
                message: format!("unparseable generation response: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(parsed.response)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "generation health check failed");
                false
            }
        }
    }
}
