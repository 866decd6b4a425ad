// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the clinic follow-up backend.
//!
//! Every failure mode — timeout, connection refused, non-2xx status,
//! unexpected payload — degrades to `None` with a log line. The dialogue
//! orchestrator treats an unreachable registry the same as an unknown
//! patient and never sees a transport error.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use clinio_core::types::{AppointmentRecord, PatientRecord, ReschedulePayload};
use clinio_core::{ClinioError, RegistryClient};

use crate::types::{AppointmentDto, PatientDto};

/// HTTP client for the follow-up backend's REST API.
#[derive(Debug, Clone)]
pub struct ClinicRegistryClient {
    client: reqwest::Client,
    base_url: String,
}

impl ClinicRegistryClient {
    /// Create a client against `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClinioError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClinioError::Registry {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Perform a request and unwrap the backend's `{statusCode, data}`
    /// envelope. Any failure returns `None`.
    async fn request_data(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Option<serde_json::Value> {
        let url = format!("{}{path}", self.base_url);

        let mut request = self.client.request(method, &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "registry request failed");
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(url, status = %status, "registry returned error status");
            return None;
        }

        let json: serde_json::Value = match response.json().await {
            Ok(json) => json,
            Err(e) => {
                warn!(url, error = %e, "registry returned unparseable body");
                return None;
            }
        };

        // Envelope handling: prefer `data` when present; a statusCode of 500
        // inside a 200 response still counts as failure.
        if let Some(object) = json.as_object() {
            if object.get("statusCode").and_then(|v| v.as_i64()) == Some(500) {
                warn!(url, "registry reported an internal error in its envelope");
                return None;
            }
            if let Some(data) = object.get("data")
                && !data.is_null()
            {
                return Some(data.clone());
            }
        }

        Some(json)
    }

    async fn fetch_patient(&self, path: &str) -> Option<PatientRecord> {
        let data = self.request_data(reqwest::Method::GET, path, None).await?;
        match serde_json::from_value::<PatientDto>(data) {
            Ok(dto) => {
                let record = dto.into_record();
                debug!(patient = record.name.as_str(), "patient found");
                Some(record)
            }
            Err(e) => {
                warn!(path, error = %e, "unexpected patient payload");
                None
            }
        }
    }
}

#[async_trait]
impl RegistryClient for ClinicRegistryClient {
    async fn find_patient_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<PatientRecord>, ClinioError> {
        debug!(phone, "looking up patient by phone");
        Ok(self
            .fetch_patient(&format!("/api/paciente/telefono/{phone}"))
            .await)
    }

    async fn find_patient_by_carnet(
        &self,
        carnet: &str,
    ) -> Result<Option<PatientRecord>, ClinioError> {
        let carnet: String = carnet
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .collect();
        debug!(carnet = carnet.as_str(), "looking up patient by carnet");
        Ok(self
            .fetch_patient(&format!("/api/paciente/carnet/{carnet}"))
            .await)
    }

    async fn get_next_appointment(
        &self,
        patient_id: &str,
    ) -> Result<Option<AppointmentRecord>, ClinioError> {
        debug!(patient_id, "fetching next appointment");
        let data = self
            .request_data(
                reqwest::Method::GET,
                &format!("/api/paciente/{patient_id}/proxima-cita"),
                None,
            )
            .await;
        let Some(data) = data else {
            return Ok(None);
        };
        match serde_json::from_value::<AppointmentDto>(data) {
            Ok(dto) => Ok(dto.into_record()),
            Err(e) => {
                warn!(patient_id, error = %e, "unexpected appointment payload");
                Ok(None)
            }
        }
    }

    async fn update_appointment(
        &self,
        payload: &ReschedulePayload,
    ) -> Result<Option<AppointmentRecord>, ClinioError> {
        let body = serde_json::json!({
            "id_paciente": payload.patient_id,
            "fecha_programada": payload
                .scheduled_at
                .format("%Y-%m-%dT%H:%M:%S%.3fZ")
                .to_string(),
            "motivo": payload.reason,
            "estado_id": payload.status_id,
        });
        debug!(patient_id = payload.patient_id.as_str(), "rescheduling appointment");

        let data = self
            .request_data(
                reqwest::Method::PUT,
                "/api/cita/update-assistant",
                Some(&body),
            )
            .await;
        let Some(data) = data else {
            return Ok(None);
        };
        match serde_json::from_value::<AppointmentDto>(data) {
            Ok(dto) => Ok(dto.into_record()),
            Err(e) => {
                warn!(error = %e, "unexpected reschedule payload");
                Ok(None)
            }
        }
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/health", self.base_url);
        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!(error = %e, "registry health check failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ClinicRegistryClient {
        ClinicRegistryClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn finds_patient_inside_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/paciente/telefono/59170123456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statusCode": 200,
                "data": {
                    "id": "p-1",
                    "nombre": "Juan Pérez",
                    "telefono": "59170123456",
                    "proxima_cita": {
                        "id": "a-1",
                        "fecha_programada": "2026-08-20T10:00:00.000Z",
                        "estado": {"descripcion": "Programado"}
                    }
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let patient = client
            .find_patient_by_phone("59170123456")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(patient.id, "p-1");
        assert_eq!(patient.name, "Juan Pérez");
        assert!(patient.next_appointment.is_some());
    }

    #[tokio::test]
    async fn not_found_is_none_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/paciente/telefono/000"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.find_patient_by_phone("000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn envelope_status_500_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/paciente/telefono/111"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statusCode": 500,
                "data": "database exploded"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.find_patient_by_phone("111").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_is_none() {
        // Point at a port nothing listens on.
        let client =
            ClinicRegistryClient::new("http://127.0.0.1:1", Duration::from_millis(200)).unwrap();
        assert!(client.find_patient_by_phone("222").await.unwrap().is_none());
        assert!(!client.health_check().await);
    }

    #[tokio::test]
    async fn update_appointment_sends_expected_payload() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/cita/update-assistant"))
            .and(body_partial_json(serde_json::json!({
                "id_paciente": "p-1",
                "fecha_programada": "2026-08-20T10:00:00.000Z",
                "estado_id": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "statusCode": 200,
                "data": {
                    "id": "a-1",
                    "fecha_programada": "2026-08-20T10:00:00.000Z",
                    "estado": {"descripcion": "Programado"}
                }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let payload = ReschedulePayload {
            patient_id: "p-1".to_string(),
            scheduled_at: Utc.with_ymd_and_hms(2026, 8, 20, 10, 0, 0).unwrap(),
            reason: "Control de Tuberculosis".to_string(),
            status_id: 1,
        };
        let record = client.update_appointment(&payload).await.unwrap().unwrap();
        assert_eq!(record.id, "a-1");
        assert_eq!(record.status, "Programado");
    }

    #[tokio::test]
    async fn health_check_reflects_backend() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        assert!(client.health_check().await);
    }
}
