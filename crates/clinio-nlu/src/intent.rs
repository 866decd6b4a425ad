// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based intent detection.
//!
//! An ordered rule table maps keyword sets to actions; the first matching
//! rule wins, and confidence values are fixed constants per action, not
//! computed. The verify-identity rule fires last, on a standalone
//! four-digit pattern.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use clinio_core::types::{ActionIntent, ExtractedAppointment, UserAction};

use crate::extract;
use crate::text::{contains_phrase, normalize};

static FOUR_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})\b").unwrap());

/// One entry of the ordered intent rule table.
struct IntentRule {
    keywords: &'static [&'static str],
    action: UserAction,
    confidence: f32,
    /// Whether the triggering message should also be mined for appointment
    /// data, so a data-rich opening message can collapse task states.
    extracts_data: bool,
}

/// Ordered rule table; entries are checked top to bottom. Keywords are
/// normalized (lowercase, no diacritics).
const RULES: &[IntentRule] = &[
    IntentRule {
        keywords: &["agendar", "programar", "cita nueva", "reservar", "quiero cita"],
        action: UserAction::Schedule,
        confidence: 0.9,
        extracts_data: true,
    },
    IntentRule {
        keywords: &["cancelar", "anular"],
        action: UserAction::Cancel,
        confidence: 0.85,
        extracts_data: false,
    },
    IntentRule {
        keywords: &["reprogramar", "cambiar", "mover cita"],
        action: UserAction::Reschedule,
        confidence: 0.85,
        extracts_data: true,
    },
    IntentRule {
        keywords: &["proxima cita", "mis citas", "cuando"],
        action: UserAction::Lookup,
        confidence: 0.8,
        extracts_data: false,
    },
];

/// Confidence assigned to the four-digit verify-identity pattern.
const VERIFY_CONFIDENCE: f32 = 0.75;

/// Classify a user message into a discrete action, if any.
///
/// `today` anchors relative-date extraction for the data-carrying intents.
pub fn detect(text: &str, today: NaiveDate) -> Option<ActionIntent> {
    let norm = normalize(text);

    for rule in RULES {
        // Word-boundary matching: "reprogramar" must not fire the
        // "programar" schedule keyword.
        if rule.keywords.iter().any(|k| contains_phrase(&norm, k)) {
            let extracted = if rule.extracts_data {
                extract::extract(text, today)
            } else {
                ExtractedAppointment::default()
            };
            debug!(action = %rule.action, "intent detected");
            return Some(ActionIntent {
                action: rule.action,
                extracted,
                digits: None,
                confidence: rule.confidence,
            });
        }
    }

    if let Some(caps) = FOUR_DIGITS.captures(text) {
        debug!(action = %UserAction::VerifyIdentity, "intent detected");
        return Some(ActionIntent {
            action: UserAction::VerifyIdentity,
            extracted: ExtractedAppointment::default(),
            digits: Some(caps[1].to_string()),
            confidence: VERIFY_CONFIDENCE,
        });
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use clinio_core::types::INTENT_CONFIDENCE_THRESHOLD;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 5).unwrap()
    }

    #[test]
    fn schedule_intent_with_data() {
        let intent = detect("quiero agendar para mañana a las 10:00", today()).unwrap();
        assert_eq!(intent.action, UserAction::Schedule);
        assert_eq!(intent.confidence, 0.9);
        assert_eq!(intent.extracted.date, Some(today().succ_opt().unwrap()));
        assert_eq!(intent.extracted.time, NaiveTime::from_hms_opt(10, 0, 0));
    }

    #[test]
    fn cancel_intent() {
        let intent = detect("necesito cancelar mi cita", today()).unwrap();
        assert_eq!(intent.action, UserAction::Cancel);
        assert_eq!(intent.confidence, 0.85);
    }

    #[test]
    fn reschedule_intent_carries_extraction() {
        let intent = detect("reprogramar mañana a las 10:00", today()).unwrap();
        assert_eq!(intent.action, UserAction::Reschedule);
        assert!(intent.extracted.date.is_some());
        assert!(intent.extracted.time.is_some());
    }

    #[test]
    fn lookup_intent_handles_accents() {
        let intent = detect("¿Cuándo es mi próxima cita?", today()).unwrap();
        assert_eq!(intent.action, UserAction::Lookup);
        assert!(intent.is_confident(INTENT_CONFIDENCE_THRESHOLD));
    }

    #[test]
    fn verify_identity_on_standalone_digits() {
        let intent = detect("mis últimos dígitos son 4821", today()).unwrap();
        assert_eq!(intent.action, UserAction::VerifyIdentity);
        assert_eq!(intent.digits.as_deref(), Some("4821"));
        assert_eq!(intent.confidence, 0.75);
    }

    #[test]
    fn earlier_rules_win_over_digit_pattern() {
        // A message with a schedule keyword and a 4-digit year classifies as
        // schedule, not verify-identity.
        let intent = detect("agendar para el 2026-09-01", today()).unwrap();
        assert_eq!(intent.action, UserAction::Schedule);
    }

    #[test]
    fn schedule_wins_over_cancel_by_order() {
        let intent = detect("quiero agendar, no cancelar", today()).unwrap();
        assert_eq!(intent.action, UserAction::Schedule);
    }

    #[test]
    fn no_intent_returns_none() {
        assert!(detect("hola, ¿cómo estás?", today()).is_none());
        assert!(detect("", today()).is_none());
    }
}
