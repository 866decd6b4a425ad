// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment data extraction from free text.
//!
//! Pure functions, deterministic given `today`. Resolution order for dates:
//! explicit ISO pattern, explicit slash pattern, relative keywords, weekday
//! names. Explicit clock times win over textual period keywords. Absence of
//! a match leaves the field `None`; nothing here ever errors.

use std::sync::LazyLock;

use chrono::{Datelike, Days, NaiveDate, NaiveTime, Weekday};
use regex::Regex;

use clinio_core::types::ExtractedAppointment;

use crate::text::{contains_phrase, normalize};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap());

static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})/(\d{1,2})/(\d{2,4})").unwrap());

static CLOCK_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})(?::\d{2})?").unwrap());

/// Weekday vocabulary, normalized.
const WEEKDAYS: &[(&str, Weekday)] = &[
    ("lunes", Weekday::Mon),
    ("martes", Weekday::Tue),
    ("miercoles", Weekday::Wed),
    ("jueves", Weekday::Thu),
    ("viernes", Weekday::Fri),
    ("sabado", Weekday::Sat),
    ("domingo", Weekday::Sun),
];

/// Textual period keywords and their canonical times.
///
/// Bare "manana" is deliberately absent: alone it means "tomorrow" (a date).
/// The morning period needs the prepositional form.
const PERIODS: &[(&str, (u32, u32))] = &[
    ("por la manana", (9, 0)),
    ("en la manana", (9, 0)),
    ("de la manana", (9, 0)),
    ("tarde", (15, 0)),
    ("noche", (18, 0)),
];

/// Reason vocabulary: normalized keyword to canonical phrase.
const REASONS: &[(&str, &str)] = &[
    ("control", "Control de rutina"),
    ("revision", "Revisión médica"),
    ("sintomas", "Consulta por síntomas"),
    ("medicacion", "Consulta de medicación"),
    ("resultados", "Consulta de resultados"),
    ("emergencia", "Emergencia"),
];

/// Extract whatever appointment fragments the message carries.
pub fn extract(text: &str, today: NaiveDate) -> ExtractedAppointment {
    ExtractedAppointment {
        date: extract_date(text, today),
        time: extract_time(text),
        reason: extract_reason(text),
    }
}

/// Resolve a date mention. First matching category wins.
pub fn extract_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    // 1. Explicit ISO pattern: 2026-08-15. Captures are all-digit groups,
    // so the parses cannot fail; out-of-range components skip the match.
    for caps in ISO_DATE.captures_iter(text) {
        let (Ok(year), Ok(month), Ok(day)) =
            (caps[1].parse(), caps[2].parse(), caps[3].parse())
        else {
            continue;
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    // 2. Explicit slash pattern: day/month/year, 2-digit years in the 2000s.
    for caps in SLASH_DATE.captures_iter(text) {
        let (Ok(day), Ok(month), Ok(mut year)) =
            (caps[1].parse::<u32>(), caps[2].parse::<u32>(), caps[3].parse::<i32>())
        else {
            continue;
        };
        if year < 100 {
            year += 2000;
        }
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    let norm = normalize(text);

    // 3. Relative keywords. "pasado manana" before "manana" so the longer
    // phrase wins.
    if norm.contains("pasado manana") {
        return today.checked_add_days(Days::new(2));
    }
    if contains_phrase(&norm, "manana") {
        return today.checked_add_days(Days::new(1));
    }
    if contains_phrase(&norm, "hoy") {
        return Some(today);
    }

    // 4. Weekday names: next occurrence strictly after today.
    for (name, weekday) in WEEKDAYS {
        if contains_phrase(&norm, name) {
            let ahead = (weekday.num_days_from_monday() as i64
                - today.weekday().num_days_from_monday() as i64)
                .rem_euclid(7);
            let ahead = if ahead == 0 { 7 } else { ahead };
            return today.checked_add_days(Days::new(ahead as u64));
        }
    }

    None
}

/// Resolve a time mention. Explicit clock times win over period keywords.
pub fn extract_time(text: &str) -> Option<NaiveTime> {
    let norm = normalize(text);

    for caps in CLOCK_TIME.captures_iter(text) {
        let (Ok(mut hour), Ok(minute)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>())
        else {
            continue;
        };
        if hour > 23 || minute > 59 {
            continue;
        }
        // 12-hour markers shift into the 24-hour clock.
        if contains_phrase(&norm, "pm") && hour < 12 {
            hour += 12;
        } else if contains_phrase(&norm, "am") && hour == 12 {
            hour = 0;
        }
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }

    for (keyword, (hour, minute)) in PERIODS {
        if contains_phrase(&norm, keyword) {
            return NaiveTime::from_hms_opt(*hour, *minute, 0);
        }
    }

    None
}

/// Map the first matching reason keyword to its canonical phrase.
pub fn extract_reason(text: &str) -> Option<String> {
    let norm = normalize(text);
    REASONS
        .iter()
        .find(|(keyword, _)| contains_phrase(&norm, keyword))
        .map(|(_, canonical)| (*canonical).to_string())
}
