// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama adapter: the production [`clinio_core::TextGenerator`].
//!
//! The fine-tuned Spanish model is served by an Ollama-compatible endpoint;
//! Clinio treats it as a black-box completion capability.

pub mod client;

pub use client::OllamaGenerator;
