// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text normalization helpers shared by the matchers.
//!
//! All keyword tables in this crate store their entries pre-normalized
//! (lowercase, no diacritics), so matching is a plain comparison after
//! running the input through [`normalize`].

/// Lowercase the text and strip Spanish diacritics (á -> a, ñ -> n, ü -> u).
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

/// Whether `phrase` appears in `text` on word boundaries.
///
/// Both arguments must already be normalized. Unlike raw substring search,
/// "si" will not fire inside "siento" and "no" will not fire inside "bueno".
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let haystack: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let needle: Vec<&str> = phrase.split_whitespace().collect();
    if needle.is_empty() || needle.len() > haystack.len() {
        return false;
    }
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_slice())
}

/// Whether any phrase in the list matches (word-boundary, normalized input).
pub fn contains_any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| contains_phrase(text, p))
}
