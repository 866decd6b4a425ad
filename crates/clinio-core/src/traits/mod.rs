// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the dialogue core.
//!
//! Each external dependency of the orchestrator (conversation persistence,
//! the clinic registry, the text-generation endpoint) is modeled as a trait
//! so production adapters and test mocks are interchangeable at the
//! composition root.

pub mod generation;
pub mod registry;
pub mod store;

pub use generation::TextGenerator;
pub use registry::RegistryClient;
pub use store::ConversationStore;
