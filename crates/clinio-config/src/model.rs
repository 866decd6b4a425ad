// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Clinio clinic assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Clinio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClinioConfig {
    /// Assistant identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Clinic business rules (hours, slot grid, closed day).
    #[serde(default)]
    pub clinic: ClinicConfig,

    /// Conversation store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Follow-up backend (patient registry) settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Text-generation endpoint settings.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Assistant identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "clinio".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Clinic business rules used by appointment validation and replies.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClinicConfig {
    /// Display name of the health center, used in user-facing replies.
    #[serde(default = "default_center_name")]
    pub center_name: String,

    /// First bookable hour (inclusive).
    #[serde(default = "default_open_hour")]
    pub open_hour: u32,

    /// Hour at which booking closes (exclusive).
    #[serde(default = "default_close_hour")]
    pub close_hour: u32,

    /// Slot grid granularity in minutes; appointment minutes must be a
    /// multiple of this value.
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,

    /// Weekday the clinic is closed (English weekday name).
    #[serde(default = "default_closed_weekday")]
    pub closed_weekday: String,

    /// How far into the future an appointment may be booked, in days.
    #[serde(default = "default_max_days_ahead")]
    pub max_days_ahead: i64,
}

impl ClinicConfig {
    /// The configured closed weekday, parsed. Validation guarantees the
    /// string parses; the fallback only protects hand-built configs.
    pub fn closed_weekday(&self) -> chrono::Weekday {
        self.closed_weekday
            .parse()
            .unwrap_or(chrono::Weekday::Sun)
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            center_name: default_center_name(),
            open_hour: default_open_hour(),
            close_hour: default_close_hour(),
            slot_minutes: default_slot_minutes(),
            closed_weekday: default_closed_weekday(),
            max_days_ahead: default_max_days_ahead(),
        }
    }
}

fn default_center_name() -> String {
    "CAÑADA DEL CARMEN".to_string()
}

fn default_open_hour() -> u32 {
    7
}

fn default_close_hour() -> u32 {
    19
}

fn default_slot_minutes() -> u32 {
    30
}

fn default_closed_weekday() -> String {
    "sunday".to_string()
}

fn default_max_days_ahead() -> i64 {
    90
}

/// Conversation store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Conversation time-to-live in seconds, refreshed on every access.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("clinio").join("clinio.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("clinio.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

fn default_ttl_secs() -> u64 {
    3600 // 1 hour of inactivity
}

/// Follow-up backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Base URL of the follow-up backend.
    #[serde(default = "default_registry_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_registry_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: default_registry_base_url(),
            timeout_secs: default_registry_timeout_secs(),
        }
    }
}

fn default_registry_base_url() -> String {
    "http://localhost:3001".to_string()
}

fn default_registry_timeout_secs() -> u64 {
    10
}

/// Text-generation endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Base URL of the generation endpoint.
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,

    /// Model identifier to request from the endpoint.
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// How many recent messages are included in the prompt history block.
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Upper bound on one generation call, in seconds.
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: default_generation_base_url(),
            model: default_generation_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_history: default_max_history(),
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

fn default_generation_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_generation_model() -> String {
    "clinio-es".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_history() -> usize {
    10
}

fn default_generation_timeout_secs() -> u64 {
    30
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Address to bind the server to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum chat requests per user per minute.
    #[serde(default = "default_rate_limit_per_minute")]
    pub rate_limit_per_minute: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            rate_limit_per_minute: default_rate_limit_per_minute(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_rate_limit_per_minute() -> u32 {
    20
}
