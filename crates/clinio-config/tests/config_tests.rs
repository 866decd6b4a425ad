// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for configuration loading and validation.

use clinio_config::{load_and_validate_str, load_config_from_str, ConfigError};

#[test]
fn defaults_match_clinic_operating_rules() {
    let config = load_config_from_str("").expect("empty config uses defaults");
    assert_eq!(config.agent.name, "clinio");
    assert_eq!(config.clinic.open_hour, 7);
    assert_eq!(config.clinic.close_hour, 19);
    assert_eq!(config.clinic.slot_minutes, 30);
    assert_eq!(config.clinic.closed_weekday(), chrono::Weekday::Sun);
    assert_eq!(config.clinic.max_days_ahead, 90);
    assert_eq!(config.store.ttl_secs, 3600);
    assert_eq!(config.generation.max_tokens, 150);
    assert_eq!(config.gateway.rate_limit_per_minute, 20);
}

#[test]
fn toml_overrides_defaults() {
    let toml = r#"
        [agent]
        name = "asistente"
        log_level = "debug"

        [clinic]
        center_name = "CENTRO NORTE"
        open_hour = 8
        close_hour = 18
        closed_weekday = "saturday"

        [store]
        ttl_secs = 7200
    "#;
    let config = load_and_validate_str(toml).expect("valid config");
    assert_eq!(config.agent.name, "asistente");
    assert_eq!(config.clinic.center_name, "CENTRO NORTE");
    assert_eq!(config.clinic.open_hour, 8);
    assert_eq!(config.clinic.closed_weekday(), chrono::Weekday::Sat);
    assert_eq!(config.store.ttl_secs, 7200);
    // Untouched sections keep their defaults.
    assert_eq!(config.registry.base_url, "http://localhost:3001");
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let errors = load_and_validate_str("[clinic]\nopen_huor = 8\n")
        .expect_err("typo must be rejected");
    let unknown = errors
        .iter()
        .find_map(|e| match e {
            ConfigError::UnknownKey { key, suggestion, .. } => {
                Some((key.clone(), suggestion.clone()))
            }
            _ => None,
        })
        .expect("an UnknownKey error");
    assert_eq!(unknown.0, "open_huor");
    assert_eq!(unknown.1.as_deref(), Some("open_hour"));
}

#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
        [clinic]
        open_hour = 20
        close_hour = 8
    "#;
    let errors = load_and_validate_str(toml).expect_err("inverted hours rejected");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("open_hour"))));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[clinic]\nopen_hour = \"seven\"\n")
        .expect_err("string where number expected");
    assert!(!errors.is_empty());
}
