// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP entry point consumed by the messaging relay.
//!
//! `POST /chat` carries one inbound user message and returns the reply plus
//! any detected action for the relay to act on. A fixed-window per-user
//! rate limit protects the generation endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use clinio_core::{RegistryClient, TextGenerator};
use clinio_dialogue::{ActionPayload, DialogueOrchestrator};

/// Request body for `POST /chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// User id: the sender's phone number.
    pub user_id: String,
    /// The inbound message text.
    pub message: String,
}

/// Response body for `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub user_id: String,
    pub conversation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<ActionPayload>,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub registry: bool,
    pub generator: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Per-user fixed-window rate limiter (window: one minute).
pub struct RateLimiter {
    windows: DashMap<String, (i64, u32)>,
    limit_per_minute: u32,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            windows: DashMap::new(),
            limit_per_minute,
        }
    }

    /// Register one request for `user_id`; `false` means over the limit.
    pub fn check(&self, user_id: &str) -> bool {
        let minute = Utc::now().timestamp() / 60;
        let mut entry = self.windows.entry(user_id.to_string()).or_insert((minute, 0));
        if entry.0 != minute {
            *entry = (minute, 0);
        }
        entry.1 += 1;
        entry.1 <= self.limit_per_minute
    }
}

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DialogueOrchestrator>,
    pub registry: Arc<dyn RegistryClient>,
    pub generator: Arc<dyn TextGenerator>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(post_chat))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// POST /chat
async fn post_chat(
    State(state): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    if !clinio_nlu::phone::validate_phone_number(&body.user_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "user_id must be a phone number".to_string(),
            }),
        )
            .into_response();
    }
    if body.message.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "message must not be empty".to_string(),
            }),
        )
            .into_response();
    }

    if !state.rate_limiter.check(&body.user_id) {
        warn!(user_id = body.user_id.as_str(), "rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                error: "too many requests, slow down".to_string(),
            }),
        )
            .into_response();
    }

    info!(user_id = body.user_id.as_str(), "chat message received");

    let turn = state
        .orchestrator
        .process_message(&body.user_id, &body.message)
        .await;

    Json(ChatResponse {
        response: turn.reply,
        user_id: body.user_id,
        conversation_id: turn.conversation_id,
        action: turn.action,
    })
    .into_response()
}

/// GET /health
async fn get_health(State(state): State<AppState>) -> Response {
    let registry = state.registry.health_check().await;
    let generator = state.generator.health_check().await;
    let status = if registry && generator { "ok" } else { "degraded" };
    Json(HealthResponse {
        status: status.to_string(),
        registry,
        generator,
    })
    .into_response()
}
