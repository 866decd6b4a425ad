// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./clinio.toml` > `~/.config/clinio/clinio.toml` >
//! `/etc/clinio/clinio.toml` with environment variable overrides via the
//! `CLINIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ClinioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/clinio/clinio.toml` (system-wide)
/// 3. `~/.config/clinio/clinio.toml` (user XDG config)
/// 4. `./clinio.toml` (local directory)
/// 5. `CLINIO_*` environment variables
pub fn load_config() -> Result<ClinioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClinioConfig::default()))
        .merge(Toml::file("/etc/clinio/clinio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("clinio/clinio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("clinio.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<ClinioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClinioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<ClinioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ClinioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CLINIO_CLINIC_CLOSED_WEEKDAY` must map
/// to `clinic.closed_weekday`, not `clinic.closed.weekday`.
fn env_provider() -> Env {
    Env::prefixed("CLINIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CLINIO_CLINIC_OPEN_HOUR -> "clinic_open_hour"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("clinic_", "clinic.", 1)
            .replacen("store_", "store.", 1)
            .replacen("registry_", "registry.", 1)
            .replacen("generation_", "generation.", 1)
            .replacen("gateway_", "gateway.", 1);
        mapped.into()
    })
}
