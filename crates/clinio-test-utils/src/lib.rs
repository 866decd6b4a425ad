// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock adapters for Clinio integration tests.
//!
//! Everything here is deterministic and in-process, so the dialogue flows
//! can be tested end to end without a database, a backend, or a model.

pub mod memory_store;
pub mod mock_generator;
pub mod mock_registry;

pub use memory_store::MemoryStore;
pub use mock_generator::MockGenerator;
pub use mock_registry::MockRegistry;
