// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue core for the Clinio clinic assistant.
//!
//! [`orchestrator::DialogueOrchestrator`] decides, per inbound message,
//! whether to advance the active multi-turn task, start one from a detected
//! intent, or fall back to free-form generation. The reschedule state
//! machine and the validated, exactly-once registry write live in
//! [`tasks`] and [`transaction`].

pub mod orchestrator;
pub mod prompt;
pub mod replies;
pub mod tasks;
pub mod transaction;

pub use orchestrator::{ActionPayload, DialogueOrchestrator, DialogueSettings, TurnReply};
pub use transaction::{AppointmentScheduler, ClinicRules, RescheduleOutcome, SlotError};
