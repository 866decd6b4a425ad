// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Clinio conversations.
//!
//! The store is a key-value table with a sliding TTL: one row per user id,
//! the conversation serialized as JSON, expiry refreshed on every access.
//! An abandoned mid-task conversation simply expires with its record.

pub mod adapter;
pub mod database;

pub use adapter::SqliteConversationStore;
pub use database::Database;
