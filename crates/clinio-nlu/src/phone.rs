// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Phone-number helpers for patient identification.
//!
//! Numbers arrive from the messaging relay in mixed formats; these helpers
//! normalize toward the Bolivian `+591` convention used by the registry.

/// Whether the text plausibly is a phone number (8-15 digits, optional `+`).
pub fn validate_phone_number(phone: &str) -> bool {
    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    let digit_count = cleaned.chars().filter(char::is_ascii_digit).count();
    if !(8..=15).contains(&digit_count) {
        return false;
    }

    // International format needs a country code on top of the local number.
    if cleaned.starts_with('+') && digit_count < 10 {
        return false;
    }

    true
}

/// Normalize a phone number to `+591...` form.
pub fn format_phone_number(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();

    if cleaned.starts_with('+') {
        return cleaned;
    }
    if cleaned.starts_with("591") {
        return format!("+{cleaned}");
    }
    if cleaned.chars().count() == 8 {
        return format!("+591{cleaned}");
    }
    format!("+{cleaned}")
}

/// The last four digits of a number, for identity verification.
pub fn extract_last_four_digits(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(4);
    digits[start..].iter().collect()
}
