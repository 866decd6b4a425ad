// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as a coherent clinic opening window and a slot grid
//! that divides the hour.

use crate::diagnostic::ConfigError;
use crate::model::ClinioConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &ClinioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.clinic.open_hour >= config.clinic.close_hour {
        errors.push(ConfigError::Validation {
            message: format!(
                "clinic.open_hour ({}) must be before clinic.close_hour ({})",
                config.clinic.open_hour, config.clinic.close_hour
            ),
        });
    }

    if config.clinic.close_hour > 24 {
        errors.push(ConfigError::Validation {
            message: format!(
                "clinic.close_hour must be at most 24, got {}",
                config.clinic.close_hour
            ),
        });
    }

    if config.clinic.slot_minutes == 0 || 60 % config.clinic.slot_minutes != 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "clinic.slot_minutes must evenly divide 60, got {}",
                config.clinic.slot_minutes
            ),
        });
    }

    if config.clinic.closed_weekday.parse::<chrono::Weekday>().is_err() {
        errors.push(ConfigError::Validation {
            message: format!(
                "clinic.closed_weekday `{}` is not a weekday name",
                config.clinic.closed_weekday
            ),
        });
    }

    if config.clinic.max_days_ahead < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "clinic.max_days_ahead must be at least 1, got {}",
                config.clinic.max_days_ahead
            ),
        });
    }

    if config.store.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "store.database_path must not be empty".to_string(),
        });
    }

    if config.store.ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "store.ttl_secs must be positive".to_string(),
        });
    }

    if config.registry.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "registry.base_url must not be empty".to_string(),
        });
    }

    if !(0.0..=2.0).contains(&config.generation.temperature) {
        errors.push(ConfigError::Validation {
            message: format!(
                "generation.temperature must be in [0.0, 2.0], got {}",
                config.generation.temperature
            ),
        });
    }

    if config.generation.max_tokens == 0 {
        errors.push(ConfigError::Validation {
            message: "generation.max_tokens must be positive".to_string(),
        });
    }

    let addr = config.gateway.bind_address.trim();
    if addr.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.bind_address must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!(
                    "gateway.bind_address `{addr}` is not a valid IP address or hostname"
                ),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
