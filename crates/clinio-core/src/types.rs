// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Clinio workspace.
//!
//! The conversation entity and its task state machine live here so the
//! store, the dialogue orchestrator, and the test mocks all agree on one
//! representation.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Roles a message in a conversation can carry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Lifecycle status of a conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Closed,
}

/// A single message inside a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Steps of the multi-turn reschedule task.
///
/// Transitions form a strict linear pipeline and are only performed by the
/// dialogue orchestrator's task handlers:
/// `AwaitingDate -> AwaitingTime -> AwaitingConfirmation -> (cleared)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum TaskState {
    #[strum(serialize = "reschedule-awaiting-date")]
    RescheduleAwaitingDate,
    #[strum(serialize = "reschedule-awaiting-time")]
    RescheduleAwaitingTime,
    #[strum(serialize = "reschedule-awaiting-confirmation")]
    RescheduleAwaitingConfirmation,
}

/// Scratch data accumulated across the turns of one active task.
///
/// Fields are typed options instead of a string map; `merge` implements the
/// new-values-win rule without ever dropping previously collected fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskData {
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub appointment_id: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub time: Option<NaiveTime>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl TaskData {
    /// Merge newly extracted fields into the bag. A field is only replaced
    /// when the extraction produced a value for it.
    pub fn merge(&mut self, extracted: &ExtractedAppointment) {
        if let Some(date) = extracted.date {
            self.date = Some(date);
        }
        if let Some(time) = extracted.time {
            self.time = Some(time);
        }
        if let Some(reason) = &extracted.reason {
            self.reason = Some(reason.clone());
        }
    }
}

/// The single active multi-turn task of a conversation.
///
/// The data bag lives inside the task, so dropping the task structurally
/// clears the bag as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTask {
    pub state: TaskState,
    pub data: TaskData,
}

/// A conversation with one user, keyed by their phone number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    pub user_id: String,
    pub messages: Vec<Message>,
    pub status: ConversationStatus,
    #[serde(default)]
    pub task: Option<ActiveTask>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a fresh conversation for a user.
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let now = Utc::now();
        Self {
            conversation_id: format!("conv_{}_{}", user_id, uuid::Uuid::new_v4()),
            user_id,
            messages: Vec::new(),
            status: ConversationStatus::Active,
            task: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    pub fn push_message(&mut self, role: MessageRole, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
        self.updated_at = Utc::now();
    }

    /// The most recent `limit` messages, oldest first.
    pub fn recent_messages(&self, limit: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(limit);
        &self.messages[start..]
    }

    /// Begin a task, replacing any previous one.
    pub fn set_task(&mut self, state: TaskState, data: TaskData) {
        self.task = Some(ActiveTask { state, data });
        self.updated_at = Utc::now();
    }

    /// Move the active task to its next state, keeping the data bag.
    pub fn advance_task(&mut self, state: TaskState) {
        if let Some(task) = &mut self.task {
            task.state = state;
            self.updated_at = Utc::now();
        }
    }

    /// Drop the active task and its data bag.
    pub fn clear_task(&mut self) {
        self.task = None;
        self.updated_at = Utc::now();
    }

    pub fn close(&mut self) {
        self.status = ConversationStatus::Closed;
        self.updated_at = Utc::now();
    }
}

/// Appointment fragments extracted from free text. Transient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedAppointment {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub reason: Option<String>,
}

impl ExtractedAppointment {
    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.time.is_none() && self.reason.is_none()
    }
}

/// Discrete user actions the intent detector can recognize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
pub enum UserAction {
    #[strum(serialize = "schedule_appointment")]
    #[serde(rename = "schedule_appointment")]
    Schedule,
    #[strum(serialize = "cancel_appointment")]
    #[serde(rename = "cancel_appointment")]
    Cancel,
    #[strum(serialize = "reschedule_appointment")]
    #[serde(rename = "reschedule_appointment")]
    Reschedule,
    #[strum(serialize = "lookup_appointments")]
    #[serde(rename = "lookup_appointments")]
    Lookup,
    #[strum(serialize = "verify_patient")]
    #[serde(rename = "verify_patient")]
    VerifyIdentity,
}

/// Default confidence threshold for acting on a detected intent.
pub const INTENT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// A classified user intention. Consumed once per turn, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionIntent {
    pub action: UserAction,
    /// Appointment fragments found in the same message, for intents that
    /// can collapse task states.
    pub extracted: ExtractedAppointment,
    /// Four-digit identity fragment, for the verify-identity intent.
    pub digits: Option<String>,
    pub confidence: f32,
}

impl ActionIntent {
    pub fn is_confident(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

/// Read-side projection of a patient in the external registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub next_appointment: Option<AppointmentRecord>,
    pub last_visit: Option<NaiveDate>,
}

/// Read-side projection of an appointment in the external registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: String,
    pub scheduled_at: DateTime<Utc>,
    pub status: String,
    pub kind: String,
}

/// The single write payload sent to the registry for a confirmed reschedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReschedulePayload {
    pub patient_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub reason: String,
    pub status_id: i64,
}
