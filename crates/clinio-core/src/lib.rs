// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Clinio clinic assistant.
//!
//! This crate provides the domain types, the workspace error type, and the
//! collaborator traits implemented by the storage, registry, and generation
//! adapters. The dialogue orchestrator depends only on what is defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::ClinioError;
pub use traits::{ConversationStore, RegistryClient, TextGenerator};
pub use types::{
    ActionIntent, ActiveTask, AppointmentRecord, Conversation, ConversationStatus,
    ExtractedAppointment, Message, MessageRole, PatientRecord, ReschedulePayload,
    TaskData, TaskState, UserAction, INTENT_CONFIDENCE_THRESHOLD,
};
