// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing reply strings and Spanish date formatting.
//!
//! Everything the assistant says outside the free-form generation path is
//! assembled here, so the wording lives in one place.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc, Weekday};

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Spanish weekday name, lowercase.
pub fn weekday_es(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábados",
        Weekday::Sun => "domingos",
    }
}

/// "20 de agosto de 2026"
pub fn format_date_es(date: NaiveDate) -> String {
    format!(
        "{} de {} de {}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

/// "10:00"
pub fn format_time_es(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// "20 de agosto a las 10:00"
pub fn format_datetime_es(at: DateTime<Utc>) -> String {
    format!(
        "{} de {} a las {:02}:{:02}",
        at.day(),
        MONTHS_ES[at.month0() as usize],
        at.hour(),
        at.minute()
    )
}

pub fn generic_apology() -> String {
    "Lo siento, ocurrió un error inesperado. Por favor intenta de nuevo.".to_string()
}

pub fn processing_trouble() -> String {
    "Lo siento, tuve un problema procesando tu mensaje. ¿Podrías reformularlo?".to_string()
}

pub fn empty_message() -> String {
    "No recibí tu mensaje. ¿Podrías escribirlo de nuevo?".to_string()
}

pub fn out_of_context(center_name: &str) -> String {
    format!(
        "Lo siento, solo puedo asistir con citas, recordatorios o información \
         del {center_name}. ¿En qué puedo ayudarte con tu cita?"
    )
}

pub fn patient_not_found() -> String {
    "No encuentro tu registro en el sistema. Por favor comunícate al centro \
     de salud para más información."
        .to_string()
}

pub fn no_appointments(patient_name: &str) -> String {
    format!("Hola {patient_name}, no tienes citas programadas en este momento.")
}

pub fn nothing_to_reschedule(patient_name: &str) -> String {
    format!("Hola {patient_name}, no tienes citas para reprogramar.")
}

pub fn lookup_summary(
    scheduled_at: DateTime<Utc>,
    kind: &str,
    status: &str,
    center_name: &str,
) -> String {
    let date = format_date_es(scheduled_at.date_naive());
    let time = format!("{:02}:{:02}", scheduled_at.hour(), scheduled_at.minute());
    format!(
        "📅 Tu próxima cita:\n\n• Fecha: {date}\n• Hora: {time}\n• Tipo: {kind}\n\
         • Estado: {status}\n\nTe esperamos en {center_name}. Si necesitas \
         reprogramar, dímelo."
    )
}

pub fn ask_for_date(current_appointment: Option<DateTime<Utc>>) -> String {
    match current_appointment {
        Some(at) => format!(
            "Tu cita actual es el {}. ¿Para qué día la reprogramamos? (Ej: mañana, lunes)",
            format_datetime_es(at)
        ),
        None => "¿Para qué día quieres reprogramar tu cita?".to_string(),
    }
}

pub fn ask_for_time(date: NaiveDate, open_hour: u32, close_hour: u32) -> String {
    format!(
        "Perfecto, para el {}. ¿A qué hora? ({open_hour}:00 - {close_hour}:00)",
        format_date_es(date)
    )
}

pub fn date_not_understood() -> String {
    "No entendí la fecha. Intenta con:\n• Mañana\n• Lunes\n• 25/08/2026".to_string()
}

pub fn time_not_understood() -> String {
    "No entendí la hora. Intenta: 10:00, 14:30".to_string()
}

pub fn confirmation_prompt(date: NaiveDate, time: NaiveTime) -> String {
    format!(
        "📅 Nueva cita:\n• {} a las {}\n\n¿Confirmas? (sí/no)",
        format_date_es(date),
        format_time_es(time)
    )
}

pub fn reconfirmation_nudge() -> String {
    "Por favor responde 'sí' para confirmar o 'no' para cancelar.".to_string()
}

pub fn reschedule_cancelled() -> String {
    "Tu cita se mantiene sin cambios.".to_string()
}

pub fn reschedule_succeeded(date: NaiveDate, time: NaiveTime, center_name: &str) -> String {
    format!(
        "✅ ¡Cita reprogramada!\n\n📅 {}\n⏰ {}\n\nTe esperamos en {center_name}. \
         No olvides traer tu carnet y medicación.",
        format_date_es(date),
        format_time_es(time)
    )
}

pub fn reschedule_failed() -> String {
    "Error al reprogramar. Intenta de nuevo.".to_string()
}

pub fn reschedule_state_lost() -> String {
    "Hubo un error. Por favor intenta reprogramar de nuevo.".to_string()
}

/// Keyword-routed canned reply used when the model output fails validation.
pub fn fallback_reply(last_message: &str, center_name: &str) -> String {
    use clinio_nlu::text::{contains_any_phrase, normalize};
    let norm = normalize(last_message);

    if contains_any_phrase(&norm, &["reprogramar", "cambiar"]) {
        return "Te ayudo a reprogramar tu cita. Primero, ¿me das los últimos \
                4 dígitos de tu teléfono para verificarte?"
            .to_string();
    }
    if contains_any_phrase(&norm, &["cancelar", "anular"]) {
        return "Entiendo que necesitas cancelar una cita. Para verificar tu \
                identidad, ¿me puedes dar los últimos 4 dígitos de tu número \
                de teléfono?"
            .to_string();
    }
    if contains_any_phrase(&norm, &["agendar", "cita", "programar"]) {
        return format!(
            "¡Claro! Te ayudo a agendar una cita en {center_name}. \
             ¿Para qué día la necesitas?"
        );
    }
    if contains_any_phrase(&norm, &["hola", "buenos", "buenas"]) {
        return format!(
            "¡Hola! Bienvenido al asistente virtual de {center_name}. Puedo \
             ayudarte a agendar, consultar o reprogramar tus citas."
        );
    }

    format!(
        "Entiendo. ¿Podrías darme más detalles? Puedo ayudarte con citas \
         médicas en {center_name}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_spanish_dates() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        assert_eq!(format_date_es(date), "20 de agosto de 2026");
    }

    #[test]
    fn formats_datetimes() {
        let at = Utc.with_ymd_and_hms(2026, 11, 3, 9, 30, 0).unwrap();
        assert_eq!(format_datetime_es(at), "3 de noviembre a las 09:30");
    }

    #[test]
    fn confirmation_prompt_contains_date_and_time() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 20).unwrap();
        let time = NaiveTime::from_hms_opt(10, 0, 0).unwrap();
        let prompt = confirmation_prompt(date, time);
        assert!(prompt.contains("20 de agosto de 2026"));
        assert!(prompt.contains("10:00"));
        assert!(prompt.contains("¿Confirmas?"));
    }

    #[test]
    fn fallback_routes_by_keyword() {
        assert!(fallback_reply("quiero agendar", "CENTRO").contains("agendar"));
        assert!(fallback_reply("cancelar todo", "CENTRO").contains("cancelar"));
        assert!(fallback_reply("hola", "CENTRO").contains("Bienvenido"));
        assert!(fallback_reply("qué tal el día", "CENTRO").contains("más detalles"));
    }
}
