// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task start and step handlers for the multi-turn flows.
//!
//! The reschedule pipeline is strictly linear: awaiting-date,
//! awaiting-time, awaiting-confirmation. A step that cannot make progress
//! re-prompts and stays put; a step whose required field already sits in
//! the data bag is skipped. Nothing is written to the registry until the
//! user explicitly confirms, and the task state is cleared after exactly
//! one write attempt.

use tracing::{error, info, warn};

use clinio_core::types::{ActionIntent, Conversation, TaskData, TaskState, UserAction};
use clinio_core::ClinioError;
use clinio_nlu::extract;
use clinio_nlu::text::{contains_any_phrase, normalize};

use crate::orchestrator::{ActionPayload, DialogueOrchestrator};
use crate::replies;
use crate::transaction::{validate_date, validate_time, RescheduleOutcome};

/// Affirmative vocabulary for the confirmation step, normalized.
const CONFIRMATIONS: &[&str] = &[
    "si",
    "yes",
    "ok",
    "confirmo",
    "confirmar",
    "dale",
    "perfecto",
    "esta bien",
    "de acuerdo",
];

/// Negative vocabulary for the confirmation step, normalized. Checked
/// before the affirmative list so "mejor no" never confirms.
const CANCELLATIONS: &[&str] = &["no", "cancelar", "espera", "mejor no", "no gracias"];

/// Reason used when the user never stated one.
const DEFAULT_REASON: &str = "Control de Tuberculosis";

impl DialogueOrchestrator {
    /// Route a message to the handler bound to the active task state.
    pub(crate) async fn dispatch_task(
        &self,
        state: TaskState,
        conversation: &mut Conversation,
        text: &str,
    ) -> Result<(String, Option<ActionPayload>), ClinioError> {
        match state {
            TaskState::RescheduleAwaitingDate => {
                self.handle_awaiting_date(conversation, text).await
            }
            TaskState::RescheduleAwaitingTime => {
                self.handle_awaiting_time(conversation, text).await
            }
            TaskState::RescheduleAwaitingConfirmation => {
                self.handle_awaiting_confirmation(conversation, text).await
            }
        }
    }

    /// Look up and present the patient's next appointment.
    pub(crate) async fn handle_lookup(
        &self,
        conversation: &mut Conversation,
    ) -> Result<(String, Option<ActionPayload>), ClinioError> {
        info!(user_id = conversation.user_id.as_str(), "looking up next appointment");

        let patient = match self
            .registry()
            .find_patient_by_phone(&conversation.user_id)
            .await
        {
            Ok(patient) => patient,
            Err(e) => {
                warn!(error = %e, "registry lookup failed");
                None
            }
        };

        let Some(patient) = patient else {
            return Ok((replies::patient_not_found(), None));
        };
        let Some(cita) = patient.next_appointment else {
            return Ok((replies::no_appointments(&patient.name), None));
        };

        let reply = replies::lookup_summary(
            cita.scheduled_at,
            &cita.kind,
            &cita.status,
            &self.settings().center_name,
        );
        let action = ActionPayload::new(
            UserAction::Lookup,
            "completed",
            serde_json::to_value(&cita).unwrap_or(serde_json::Value::Null),
        );
        Ok((reply, Some(action)))
    }

    /// Begin the reschedule flow from a detected intent.
    ///
    /// Verifies the patient and their reschedulable appointment, seeds the
    /// data bag, merges whatever the triggering message already carried,
    /// and lands on the first state whose field is still missing. Invalid
    /// pre-supplied values are treated as missing, with the validation
    /// message as the reply.
    pub(crate) async fn start_reschedule(
        &self,
        conversation: &mut Conversation,
        intent: &ActionIntent,
    ) -> Result<(String, Option<ActionPayload>), ClinioError> {
        info!(user_id = conversation.user_id.as_str(), "starting reschedule flow");

        let patient = match self
            .registry()
            .find_patient_by_phone(&conversation.user_id)
            .await
        {
            Ok(patient) => patient,
            Err(e) => {
                warn!(error = %e, "registry lookup failed");
                None
            }
        };

        let Some(patient) = patient else {
            return Ok((replies::patient_not_found(), None));
        };
        let Some(cita) = patient.next_appointment.clone() else {
            return Ok((replies::nothing_to_reschedule(&patient.name), None));
        };

        let mut data = TaskData {
            patient_id: Some(patient.id.clone()),
            patient_name: Some(patient.name.clone()),
            appointment_id: Some(cita.id.clone()),
            ..TaskData::default()
        };
        data.merge(&intent.extracted);

        let today = self.today();
        let rules = self.settings().rules;
        let mut rejection = None;

        if let Some(date) = data.date
            && let Err(e) = validate_date(date, today, &rules)
        {
            rejection = Some(e.user_message());
            data.date = None;
        }
        if let Some(time) = data.time
            && let Err(e) = validate_time(time, &rules)
        {
            rejection = Some(e.user_message());
            data.time = None;
        }

        let (state, reply) = match (data.date, data.time) {
            (None, _) => (
                TaskState::RescheduleAwaitingDate,
                rejection.unwrap_or_else(|| replies::ask_for_date(Some(cita.scheduled_at))),
            ),
            (Some(date), None) => (
                TaskState::RescheduleAwaitingTime,
                rejection.unwrap_or_else(|| {
                    replies::ask_for_time(date, rules.open_hour, rules.close_hour)
                }),
            ),
            (Some(date), Some(time)) => (
                TaskState::RescheduleAwaitingConfirmation,
                replies::confirmation_prompt(date, time),
            ),
        };

        info!(state = %state, "reschedule task entered");
        conversation.set_task(state, data);

        Ok((
            reply,
            Some(ActionPayload::new(
                UserAction::Reschedule,
                "in_progress",
                serde_json::Value::Null,
            )),
        ))
    }

    /// Awaiting-date step: extract and validate a date, or re-prompt.
    async fn handle_awaiting_date(
        &self,
        conversation: &mut Conversation,
        text: &str,
    ) -> Result<(String, Option<ActionPayload>), ClinioError> {
        let today = self.today();

        let Some(date) = extract::extract_date(text, today) else {
            return Ok((replies::date_not_understood(), None));
        };
        if let Err(e) = validate_date(date, today, &self.settings().rules) {
            return Ok((e.user_message(), None));
        }

        let pending_time = {
            let Some(task) = conversation.task.as_mut() else {
                return Err(ClinioError::Internal(
                    "awaiting-date dispatched without an active task".to_string(),
                ));
            };
            task.data.date = Some(date);
            task.data.time
        };

        // Skip awaiting-time when the opening message already supplied it.
        match pending_time {
            Some(time) => {
                conversation.advance_task(TaskState::RescheduleAwaitingConfirmation);
                Ok((replies::confirmation_prompt(date, time), None))
            }
            None => {
                conversation.advance_task(TaskState::RescheduleAwaitingTime);
                let rules = self.settings().rules;
                Ok((
                    replies::ask_for_time(date, rules.open_hour, rules.close_hour),
                    None,
                ))
            }
        }
    }

    /// Awaiting-time step: extract and validate a time, or re-prompt.
    async fn handle_awaiting_time(
        &self,
        conversation: &mut Conversation,
        text: &str,
    ) -> Result<(String, Option<ActionPayload>), ClinioError> {
        let Some(time) = extract::extract_time(text) else {
            return Ok((replies::time_not_understood(), None));
        };
        if let Err(e) = validate_time(time, &self.settings().rules) {
            return Ok((e.user_message(), None));
        }

        let stored_date = {
            let Some(task) = conversation.task.as_mut() else {
                return Err(ClinioError::Internal(
                    "awaiting-time dispatched without an active task".to_string(),
                ));
            };
            task.data.time = Some(time);
            task.data.date
        };

        let Some(date) = stored_date else {
            // The bag lost its date: fatal for this turn, never stuck.
            error!("awaiting-time reached without a date in the task data");
            conversation.clear_task();
            return Ok((replies::reschedule_state_lost(), None));
        };

        conversation.advance_task(TaskState::RescheduleAwaitingConfirmation);
        Ok((replies::confirmation_prompt(date, time), None))
    }

    /// Awaiting-confirmation step: cancel, confirm, or re-prompt.
    async fn handle_awaiting_confirmation(
        &self,
        conversation: &mut Conversation,
        text: &str,
    ) -> Result<(String, Option<ActionPayload>), ClinioError> {
        let norm = normalize(text);

        if contains_any_phrase(&norm, CANCELLATIONS) {
            info!("reschedule cancelled by user");
            conversation.clear_task();
            return Ok((replies::reschedule_cancelled(), None));
        }

        if !contains_any_phrase(&norm, CONFIRMATIONS) {
            return Ok((replies::reconfirmation_nudge(), None));
        }

        let data = conversation
            .task
            .as_ref()
            .map(|t| t.data.clone())
            .unwrap_or_default();

        let (Some(date), Some(time), Some(patient_id)) =
            (data.date, data.time, data.patient_id.clone())
        else {
            error!(
                has_date = data.date.is_some(),
                has_time = data.time.is_some(),
                has_patient = data.patient_id.is_some(),
                "required fields missing from task data at confirmation"
            );
            conversation.clear_task();
            return Ok((replies::reschedule_state_lost(), None));
        };

        let reason = data.reason.unwrap_or_else(|| DEFAULT_REASON.to_string());

        let outcome = self
            .scheduler()
            .reschedule(&patient_id, date, time, &reason, self.today())
            .await?;

        // One attempt per confirmation: the cleared state is what prevents
        // a repeated "sí" from double-submitting.
        conversation.clear_task();

        match outcome {
            RescheduleOutcome::Confirmed(record) => {
                info!(appointment_id = record.id.as_str(), "reschedule confirmed");
                let action = ActionPayload::new(
                    UserAction::Reschedule,
                    "completed",
                    serde_json::to_value(&record).unwrap_or(serde_json::Value::Null),
                );
                Ok((
                    replies::reschedule_succeeded(date, time, &self.settings().center_name),
                    Some(action),
                ))
            }
            RescheduleOutcome::Rejected(rejection) => Ok((
                format!(
                    "{} Por favor intenta reprogramar de nuevo.",
                    rejection.user_message()
                ),
                None,
            )),
            RescheduleOutcome::Failed => Ok((replies::reschedule_failed(), None)),
        }
    }
}
