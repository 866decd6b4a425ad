// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the clinic's follow-up backend.
//!
//! The backend owns the patient and appointment records; Clinio only reads
//! them and issues one update per confirmed reschedule. See
//! [`client::ClinicRegistryClient`] for the failure-degradation contract.

pub mod client;
pub mod types;

pub use client::ClinicRegistryClient;
