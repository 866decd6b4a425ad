// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured prompt assembly for the free-form generation path.
//!
//! The fine-tuned model was trained on a `<SYS>` / `<DATA>` / `<HISTORY>`
//! format: system rules, read-only registry facts, recent history, and the
//! current user message. The `<DATA>` block is the only source of patient
//! facts the model is allowed to state, which keeps hallucinated names and
//! dates out of replies.

use chrono::Timelike;

use clinio_core::types::{Conversation, Message, MessageRole, PatientRecord};

/// Maximum characters a history entry may have before it is dropped from
/// the prompt (runaway earlier completions would poison generation).
const MAX_HISTORY_ENTRY_CHARS: usize = 200;

/// Assemble the full structured prompt for one completion.
pub fn build_prompt(
    conversation: &Conversation,
    patient: Option<&PatientRecord>,
    center_name: &str,
    max_history: usize,
) -> String {
    let system_block = format!(
        "<SYS>\n\
         Eres un asistente virtual especializado SOLO en Tuberculosis del \
         centro de salud {center_name}.\n\
         Responde solo con información basada en los datos proporcionados en <DATA>.\n\
         Si NO hay datos explícitos, responde: \"No tengo esa información registrada\".\n\
         NUNCA inventes nombres, fechas o información que no esté en <DATA>.\n\
         Máximo 2 oraciones por respuesta.\n\
         Si preguntan algo fuera de Tuberculosis, responde: \"Lo siento, solo \
         atiendo consultas sobre Tuberculosis\".\n\
         </SYS>"
    );

    let data_block = build_data_block(patient);

    let valid: Vec<&Message> = conversation
        .recent_messages(max_history)
        .iter()
        .filter(|m| is_usable_history(&m.content))
        .collect();

    let last_user_message = valid
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
        .unwrap_or("Hola");

    let history_lines: Vec<String> = valid
        .iter()
        .take(valid.len().saturating_sub(1))
        .filter_map(|m| match m.role {
            MessageRole::User => Some(format!("<USER>: {}", m.content)),
            MessageRole::Assistant => Some(format!("<ASSISTANT>: {}", m.content)),
            MessageRole::System => None,
        })
        .collect();

    if history_lines.is_empty() {
        format!(
            "{system_block}\n\n<DATA>\n{data_block}\n</DATA>\n\n\
             <USER>: {last_user_message}\n<ASSISTANT>:"
        )
    } else {
        format!(
            "{system_block}\n\n<DATA>\n{data_block}\n</DATA>\n\n\
             <HISTORY>\n{}\n</HISTORY>\n\n\
             <USER>: {last_user_message}\n<ASSISTANT>:",
            history_lines.join("\n")
        )
    }
}

/// The read-only facts block. Unregistered users get explicit negatives so
/// the model cannot invent a registration.
fn build_data_block(patient: Option<&PatientRecord>) -> String {
    let mut lines = Vec::new();

    match patient {
        Some(patient) => {
            lines.push("Paciente_registrado = True".to_string());
            lines.push(format!("Nombre = \"{}\"", patient.name));
            match &patient.next_appointment {
                Some(cita) => {
                    let fecha = cita.scheduled_at.date_naive();
                    let hora = format!(
                        "{:02}:{:02}",
                        cita.scheduled_at.hour(),
                        cita.scheduled_at.minute()
                    );
                    lines.push(format!(
                        "Citas = [{{fecha: \"{fecha}\", hora: \"{hora}\", estado: \"{}\"}}]",
                        cita.status
                    ));
                }
                None => lines.push("Citas = []".to_string()),
            }
            match patient.last_visit {
                Some(visita) => lines.push(format!("Ultima_visita = \"{visita}\"")),
                None => lines.push("Ultima_visita = None".to_string()),
            }
        }
        None => {
            lines.push("Paciente_registrado = False".to_string());
            lines.push("Nombre = None".to_string());
            lines.push("Citas = []".to_string());
            lines.push("Ultima_visita = None".to_string());
        }
    }

    lines.join("\n")
}

/// Whether a stored message is clean enough to feed back into the prompt.
fn is_usable_history(content: &str) -> bool {
    content.chars().count() <= MAX_HISTORY_ENTRY_CHARS
        && !clinio_nlu::sanitize::contains_garbled(content)
}
