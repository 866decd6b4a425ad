// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language understanding for the Clinio clinic assistant.
//!
//! Three concerns, all deterministic and free of side effects:
//! - [`intent`]: classify a message into a discrete action
//! - [`extract`]: pull date/time/reason fragments out of free text
//! - [`sanitize`]: clean model output and gate inbound messages
//!
//! Everything is keyword/pattern driven by design: the rule tables are the
//! localization surface and the test surface at once.

pub mod extract;
pub mod intent;
pub mod phone;
pub mod sanitize;
pub mod text;
