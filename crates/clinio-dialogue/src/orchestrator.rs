// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The dialogue orchestrator: one inbound message in, one reply out.
//!
//! Per turn, the orchestrator either advances the active multi-step task,
//! starts a new one from a detected intent, or falls through to free-form
//! generation. It owns the invariants the rest of the system relies on:
//! exactly one assistant message appended per turn, exactly one persist at
//! the end of the turn, no external write before an explicit confirmation,
//! and a reply produced even under total failure.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use clinio_config::ClinioConfig;
use clinio_core::types::{
    Conversation, MessageRole, UserAction, INTENT_CONFIDENCE_THRESHOLD,
};
use clinio_core::{ClinioError, ConversationStore, RegistryClient, TextGenerator};
use clinio_nlu::{intent, sanitize};

use crate::prompt;
use crate::replies;
use crate::transaction::{AppointmentScheduler, ClinicRules};

/// Settings the orchestrator needs, extracted from the full config once.
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    pub center_name: String,
    pub rules: ClinicRules,
    pub conversation_ttl: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
    pub max_history: usize,
    pub generation_timeout: Duration,
}

impl DialogueSettings {
    pub fn from_config(config: &ClinioConfig) -> Self {
        Self {
            center_name: config.clinic.center_name.clone(),
            rules: ClinicRules::from_config(&config.clinic),
            conversation_ttl: Duration::from_secs(config.store.ttl_secs),
            max_tokens: config.generation.max_tokens,
            temperature: config.generation.temperature,
            max_history: config.generation.max_history,
            generation_timeout: Duration::from_secs(config.generation.timeout_secs),
        }
    }
}

/// Side-effect description returned alongside a reply, for the messaging
/// layer to act on.
#[derive(Debug, Clone, Serialize)]
pub struct ActionPayload {
    pub action: UserAction,
    pub status: String,
    pub data: serde_json::Value,
}

impl ActionPayload {
    pub fn new(action: UserAction, status: &str, data: serde_json::Value) -> Self {
        Self {
            action,
            status: status.to_string(),
            data,
        }
    }
}

/// The result of one dialogue turn.
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub reply: String,
    pub conversation_id: String,
    pub action: Option<ActionPayload>,
}

/// Coordinates stores, registry, and generator for each inbound message.
///
/// All collaborators are injected; the orchestrator holds no process-wide
/// state beyond its configuration.
pub struct DialogueOrchestrator {
    store: Arc<dyn ConversationStore>,
    registry: Arc<dyn RegistryClient>,
    generator: Arc<dyn TextGenerator>,
    scheduler: AppointmentScheduler,
    settings: DialogueSettings,
}

impl DialogueOrchestrator {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        registry: Arc<dyn RegistryClient>,
        generator: Arc<dyn TextGenerator>,
        settings: DialogueSettings,
    ) -> Self {
        let scheduler = AppointmentScheduler::new(registry.clone(), settings.rules);
        Self {
            store,
            registry,
            generator,
            scheduler,
            settings,
        }
    }

    pub(crate) fn registry(&self) -> &Arc<dyn RegistryClient> {
        &self.registry
    }

    pub(crate) fn scheduler(&self) -> &AppointmentScheduler {
        &self.scheduler
    }

    pub(crate) fn settings(&self) -> &DialogueSettings {
        &self.settings
    }

    /// Today's date, anchoring relative-date extraction and validation.
    pub(crate) fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Top-level entry point. Always produces a reply; internal failures
    /// degrade to a generic apology with the task state cleared.
    pub async fn process_message(&self, user_id: &str, text: &str) -> TurnReply {
        let text = sanitize::clean_input(text);
        if text.is_empty() {
            return TurnReply {
                reply: replies::empty_message(),
                conversation_id: String::new(),
                action: None,
            };
        }

        match self.handle_turn(user_id, &text).await {
            Ok(reply) => reply,
            Err(e) => {
                error!(user_id, error = %e, "turn failed, degrading to apology");
                let conversation_id = self.recover(user_id).await;
                TurnReply {
                    reply: replies::generic_apology(),
                    conversation_id,
                    action: None,
                }
            }
        }
    }

    /// One full turn: load state, dispatch, append the reply, persist once.
    async fn handle_turn(&self, user_id: &str, text: &str) -> Result<TurnReply, ClinioError> {
        let mut conversation = match self.store.get(user_id).await? {
            Some(conversation) => conversation,
            None => {
                info!(user_id, "starting new conversation");
                Conversation::new(user_id)
            }
        };

        conversation.push_message(MessageRole::User, text);

        let active_state = conversation.task.as_ref().map(|t| t.state);
        let (reply, action) = match active_state {
            Some(state) => {
                debug!(user_id, state = %state, "dispatching to task handler");
                self.dispatch_task(state, &mut conversation, text).await?
            }
            None => self.dispatch_intent(&mut conversation, text).await?,
        };

        conversation.push_message(MessageRole::Assistant, &reply);
        self.store
            .save(&conversation, self.settings.conversation_ttl)
            .await?;

        Ok(TurnReply {
            reply,
            conversation_id: conversation.conversation_id,
            action,
        })
    }

    /// No active task: detect an intent or fall through to generation.
    async fn dispatch_intent(
        &self,
        conversation: &mut Conversation,
        text: &str,
    ) -> Result<(String, Option<ActionPayload>), ClinioError> {
        let intent = intent::detect(text, self.today())
            .filter(|i| i.is_confident(INTENT_CONFIDENCE_THRESHOLD));

        match intent {
            Some(intent) => match intent.action {
                UserAction::Lookup => self.handle_lookup(conversation).await,
                UserAction::Reschedule => self.start_reschedule(conversation, &intent).await,
                passthrough => {
                    // Schedule, cancel, and identity verification have no
                    // structured flow here; the reply comes from the model
                    // and the action is surfaced to the messaging layer.
                    info!(action = %passthrough, "surfacing intent without task");
                    let data = match passthrough {
                        UserAction::Schedule => serde_json::json!({
                            "extracted": &intent.extracted,
                            "missing_fields": missing_fields(&intent.extracted),
                        }),
                        UserAction::VerifyIdentity => serde_json::json!({
                            "last_four_digits": &intent.digits,
                        }),
                        _ => serde_json::Value::Null,
                    };
                    let reply = self.generate_reply(conversation).await?;
                    Ok((
                        reply,
                        Some(ActionPayload::new(passthrough, "collecting_info", data)),
                    ))
                }
            },
            None => Ok((self.generate_reply(conversation).await?, None)),
        }
    }

    /// Free-form path: context gate, registry facts, bounded generation,
    /// sanitation, validity gate.
    async fn generate_reply(&self, conversation: &Conversation) -> Result<String, ClinioError> {
        let last_message = conversation
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();

        if !sanitize::is_on_topic(&last_message) {
            info!("message out of clinic context, sending redirect");
            return Ok(replies::out_of_context(&self.settings.center_name));
        }

        // Registry facts are best-effort: an unreachable backend produces an
        // "unregistered" data block, not a failed turn.
        let patient = match self.registry.find_patient_by_phone(&conversation.user_id).await {
            Ok(patient) => patient,
            Err(e) => {
                warn!(error = %e, "registry lookup failed during prompt assembly");
                None
            }
        };

        let prompt = prompt::build_prompt(
            conversation,
            patient.as_ref(),
            &self.settings.center_name,
            self.settings.max_history,
        );

        let completion = tokio::time::timeout(
            self.settings.generation_timeout,
            self.generator
                .complete(&prompt, self.settings.max_tokens, self.settings.temperature),
        )
        .await;

        let raw = match completion {
            Err(_) => {
                warn!(
                    timeout = ?self.settings.generation_timeout,
                    "generation timed out"
                );
                return Ok(replies::processing_trouble());
            }
            Ok(Err(e)) => {
                warn!(error = %e, "generation failed");
                return Ok(replies::processing_trouble());
            }
            Ok(Ok(raw)) => raw,
        };

        let cleaned = sanitize::clean_response(&raw);
        if cleaned.chars().count() < 5 || !sanitize::is_valid_response(&cleaned) {
            warn!("completion rejected by validity gate, using fallback");
            return Ok(replies::fallback_reply(
                &last_message,
                &self.settings.center_name,
            ));
        }

        Ok(cleaned)
    }

    /// Best-effort recovery after a failed turn: clear the task so the
    /// session cannot stay stuck, record the apology, persist.
    async fn recover(&self, user_id: &str) -> String {
        match self.store.get(user_id).await {
            Ok(Some(mut conversation)) => {
                conversation.clear_task();
                conversation.push_message(MessageRole::Assistant, replies::generic_apology());
                if let Err(e) = self
                    .store
                    .save(&conversation, self.settings.conversation_ttl)
                    .await
                {
                    error!(user_id, error = %e, "failed to persist recovery state");
                }
                conversation.conversation_id
            }
            Ok(None) => String::new(),
            Err(e) => {
                error!(user_id, error = %e, "failed to load conversation for recovery");
                String::new()
            }
        }
    }
}

/// Which of the two required fields are still missing from an extraction.
fn missing_fields(extracted: &clinio_core::types::ExtractedAppointment) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if extracted.date.is_none() {
        missing.push("fecha");
    }
    if extracted.time.is_none() {
        missing.push("hora");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinio_core::types::ExtractedAppointment;

    #[test]
    fn missing_fields_reports_both_when_empty() {
        let extracted = ExtractedAppointment::default();
        assert_eq!(missing_fields(&extracted), vec!["fecha", "hora"]);
    }

    #[test]
    fn missing_fields_reports_remaining() {
        let extracted = ExtractedAppointment {
            date: NaiveDate::from_ymd_opt(2026, 8, 20),
            ..ExtractedAppointment::default()
        };
        assert_eq!(missing_fields(&extracted), vec!["hora"]);
    }
}
