// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model-output sanitation and input-side validity gates.
//!
//! Small language models fine-tuned on dialogue transcripts leak role
//! prefixes, invent follow-up turns, and occasionally emit garbled dates or
//! repeated tokens. `clean_response` normalizes the raw completion into at
//! most two well-terminated sentences; `is_valid_response` rejects output
//! that should be replaced by a fallback reply; `is_on_topic` gates inbound
//! messages to the tuberculosis domain.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::text::{contains_any_phrase, normalize};

/// Role prefixes stripped from the start of a completion.
const ROLE_PREFIXES: &[&str] = &["<ASSISTANT>:", "Asistente:", "Assistant:", ":"];

/// Markers after which a completion is fabricating further conversation.
const STOP_MARKERS: &[&str] = &[
    "\n\n",
    "\n:",
    "\n<USER>:",
    "\n<ASSISTANT>:",
    "Paciente:",
    "Usuario:",
];

/// Hard cap on a cleaned reply, in characters.
const MAX_REPLY_CHARS: usize = 300;

/// Responses longer than this are considered runaway generation.
const MAX_VALID_CHARS: usize = 400;

/// Known garbled words the fine-tuned model has produced.
const GARBLED_WORDS: &[&str] = &["tuberación", "tuberculos", "cañadi", "carmi"];

/// Greetings always pass the context gate.
const GREETINGS: &[&str] = &[
    "hola",
    "buenos dias",
    "buenas tardes",
    "buenas noches",
    "saludos",
    "hi",
    "hello",
];

/// Domain keywords that mark a message as in-context.
const DOMAIN_KEYWORDS: &[&str] = &[
    "tuberculosis",
    "tb",
    "tos",
    "fiebre",
    "sudor",
    "peso",
    "respirar",
    "cita",
    "control",
    "tratamiento",
    "medicamento",
    "pastilla",
    "agendar",
    "cancelar",
    "reprogramar",
    "cuando",
    "salud",
    "sintoma",
    "dolor",
    "pecho",
    "sangre",
];

/// Keywords that mark a message as clearly out of the clinic's domain.
const OFF_DOMAIN_KEYWORDS: &[&str] = &[
    "hipotenusa",
    "matematica",
    "trigonometria",
    "fisica",
    "quimica",
    "odontologia",
    "dentista",
    "muela",
    "diente",
    "embarazo",
    "ginecologia",
    "pediatria",
    "futbol",
    "deporte",
    "politica",
    "clima",
];

static SLASH_DATE_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2,})/(\d{2,})/(\d{2,})").unwrap());

/// Sanitize an inbound user message: trim, drop control characters,
/// collapse whitespace, and bound the length.
pub fn clean_input(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .collect();
    let mut cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() > 1000 {
        cleaned = cleaned.chars().take(1000).collect();
    }
    cleaned
}

/// Clean a raw model completion into a bounded, well-terminated reply.
pub fn clean_response(raw: &str) -> String {
    let mut response = raw.trim().to_string();

    for prefix in ROLE_PREFIXES {
        if let Some(rest) = response.strip_prefix(prefix) {
            response = rest.trim_start().to_string();
        }
    }

    for marker in STOP_MARKERS {
        if let Some(idx) = response.find(marker) {
            response.truncate(idx);
        }
    }

    let sentences = split_sentences(&response);
    if sentences.len() > 2 {
        warn!(count = sentences.len(), "completion exceeded sentence cap");
        response = format!("{} {}", sentences[0], sentences[1]);
    }

    let mut response = response.split_whitespace().collect::<Vec<_>>().join(" ");

    if response.chars().count() > MAX_REPLY_CHARS {
        response = response.chars().take(MAX_REPLY_CHARS).collect();
        response = response.trim_end().to_string();
    }

    if !response.is_empty() && !response.ends_with(['.', '!', '?']) {
        response.push('.');
    }

    response
}

/// Whether a cleaned completion is coherent enough to send.
pub fn is_valid_response(response: &str) -> bool {
    // Absurd slash dates: day > 31, month > 12, year > 2100.
    for caps in SLASH_DATE_TOKENS.captures_iter(response) {
        let (Ok(day), Ok(month), Ok(year)) = (
            caps[1].parse::<i64>(),
            caps[2].parse::<i64>(),
            caps[3].parse::<i64>(),
        ) else {
            continue;
        };
        if day > 31 || month > 12 || year > 2100 {
            warn!(date = &caps[0], "absurd date in completion");
            return false;
        }
    }

    // A token repeated three times in a row signals degenerate sampling.
    let words: Vec<&str> = response.split_whitespace().collect();
    for window in words.windows(3) {
        if window[0] == window[1] && window[1] == window[2] {
            warn!(token = window[0], "repeated token in completion");
            return false;
        }
    }

    if contains_garbled(response) {
        warn!("garbled word in completion");
        return false;
    }

    if response.chars().count() > MAX_VALID_CHARS {
        warn!("completion beyond length cap");
        return false;
    }

    true
}

/// Whether the text contains one of the model's known garbled words.
///
/// Also used to filter poisoned entries out of the prompt history.
pub fn contains_garbled(text: &str) -> bool {
    let lower = text.to_lowercase();
    GARBLED_WORDS.iter().any(|w| lower.contains(w))
}

/// Whether an inbound message belongs to the tuberculosis domain.
///
/// Greetings and short questions always pass; known off-domain keywords and
/// long keyword-free messages fail.
pub fn is_on_topic(message: &str) -> bool {
    let trimmed = message.trim();
    let norm = normalize(trimmed);

    if contains_any_phrase(&norm, GREETINGS) {
        return true;
    }

    if contains_any_phrase(&norm, DOMAIN_KEYWORDS) {
        return true;
    }

    let len = trimmed.chars().count();
    if len < 20 && trimmed.contains('?') {
        return true;
    }

    if contains_any_phrase(&norm, OFF_DOMAIN_KEYWORDS) {
        return false;
    }

    len <= 100
}

/// Split text into sentences. A boundary is `.`, `!` or `?` followed by
/// whitespace and an uppercase letter (Spanish accents included).
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < chars.len() {
        if matches!(chars[i], '.' | '!' | '?') {
            let mut j = i + 1;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < chars.len() && chars[j].is_uppercase() {
                let sentence: String = chars[start..=i].iter().collect();
                let sentence = sentence.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = j;
                i = j;
                continue;
            }
        }
        i += 1;
    }
    if start < chars.len() {
        let tail: String = chars[start..].iter().collect();
        let tail = tail.trim().to_string();
        if !tail.is_empty() {
            sentences.push(tail);
        }
    }
    sentences
}
