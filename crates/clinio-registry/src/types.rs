// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the follow-up backend and conversions into domain types.
//!
//! The backend speaks Spanish field names and wraps most responses in a
//! `{statusCode, data}` envelope. Identifiers arrive as either numbers or
//! strings depending on the endpoint, so they deserialize flexibly.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

use clinio_core::types::{AppointmentRecord, PatientRecord};

/// An identifier that may arrive as a JSON number or string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Num(i64),
    Str(String),
}

impl FlexibleId {
    pub fn into_string(self) -> String {
        match self {
            FlexibleId::Num(n) => n.to_string(),
            FlexibleId::Str(s) => s,
        }
    }
}

/// A `{descripcion}` sub-object (appointment status, type, reason).
#[derive(Debug, Clone, Deserialize)]
pub struct DescriptionDto {
    #[serde(default)]
    pub descripcion: Option<String>,
}

/// Appointment as the backend reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentDto {
    pub id: FlexibleId,
    #[serde(default)]
    pub fecha_programada: Option<String>,
    #[serde(default)]
    pub estado: Option<DescriptionDto>,
    #[serde(default)]
    pub tipo: Option<DescriptionDto>,
}

/// Patient as the backend reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct PatientDto {
    pub id: FlexibleId,
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub proxima_cita: Option<AppointmentDto>,
    #[serde(default)]
    pub ultima_visita: Option<String>,
}

impl AppointmentDto {
    /// Project into the domain record. Returns `None` when the scheduled
    /// timestamp is missing or unparseable.
    pub fn into_record(self) -> Option<AppointmentRecord> {
        let scheduled_at = parse_backend_timestamp(self.fecha_programada.as_deref()?)?;
        Some(AppointmentRecord {
            id: self.id.into_string(),
            scheduled_at,
            status: self
                .estado
                .and_then(|d| d.descripcion)
                .unwrap_or_else(|| "Programado".to_string()),
            kind: self
                .tipo
                .and_then(|d| d.descripcion)
                .unwrap_or_else(|| "Control de Tuberculosis".to_string()),
        })
    }
}

impl PatientDto {
    pub fn into_record(self) -> PatientRecord {
        let next_appointment = self.proxima_cita.and_then(AppointmentDto::into_record);
        let last_visit = self
            .ultima_visita
            .as_deref()
            .and_then(|s| NaiveDate::parse_from_str(&s[..s.len().min(10)], "%Y-%m-%d").ok());
        PatientRecord {
            id: self.id.into_string(),
            name: self.nombre.unwrap_or_else(|| "paciente".to_string()),
            phone: self.telefono.unwrap_or_default(),
            next_appointment,
            last_visit,
        }
    }
}

/// Parse the backend's timestamp flavors: RFC 3339 with or without a
/// timezone suffix. Naive timestamps are taken as UTC.
pub fn parse_backend_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_zulu_and_naive_timestamps() {
        let zulu = parse_backend_timestamp("2026-08-20T10:00:00.000Z").unwrap();
        assert_eq!(zulu.to_rfc3339(), "2026-08-20T10:00:00+00:00");

        let naive = parse_backend_timestamp("2026-08-20T10:00:00").unwrap();
        assert_eq!(naive, zulu);

        assert!(parse_backend_timestamp("no es fecha").is_none());
    }

    #[test]
    fn patient_dto_projects_to_record() {
        let json = serde_json::json!({
            "id": 42,
            "nombre": "Juan Pérez",
            "telefono": "+59170123456",
            "proxima_cita": {
                "id": "a-1",
                "fecha_programada": "2026-08-20T10:00:00.000Z",
                "estado": {"descripcion": "Programado"},
                "tipo": {"descripcion": "Control de Tuberculosis"}
            },
            "ultima_visita": "2026-07-01"
        });
        let dto: PatientDto = serde_json::from_value(json).unwrap();
        let record = dto.into_record();
        assert_eq!(record.id, "42");
        assert_eq!(record.name, "Juan Pérez");
        let cita = record.next_appointment.unwrap();
        assert_eq!(cita.id, "a-1");
        assert_eq!(cita.status, "Programado");
        assert_eq!(
            record.last_visit,
            NaiveDate::from_ymd_opt(2026, 7, 1)
        );
    }

    #[test]
    fn appointment_without_timestamp_is_dropped() {
        let json = serde_json::json!({"id": 1});
        let dto: AppointmentDto = serde_json::from_value(json).unwrap();
        assert!(dto.into_record().is_none());
    }
}
