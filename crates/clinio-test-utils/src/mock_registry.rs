// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock clinic registry with scripted patients and recorded writes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use clinio_core::types::{AppointmentRecord, PatientRecord, ReschedulePayload};
use clinio_core::{ClinioError, RegistryClient};

/// A scripted in-memory registry.
///
/// Patients are keyed by phone number. Every `update_appointment` call is
/// recorded so tests can assert the exactly-once write guarantee;
/// `fail_updates(true)` makes the write path report remote failure
/// (`Ok(None)`), matching the production client's degradation contract.
pub struct MockRegistry {
    patients: Arc<Mutex<HashMap<String, PatientRecord>>>,
    updates: Arc<Mutex<Vec<ReschedulePayload>>>,
    failing_updates: AtomicBool,
    healthy: AtomicBool,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self {
            patients: Arc::new(Mutex::new(HashMap::new())),
            updates: Arc::new(Mutex::new(Vec::new())),
            failing_updates: AtomicBool::new(false),
            healthy: AtomicBool::new(true),
        }
    }

    /// Register a patient reachable at `phone`.
    pub async fn add_patient(&self, phone: impl Into<String>, patient: PatientRecord) {
        self.patients.lock().await.insert(phone.into(), patient);
    }

    /// Make subsequent appointment updates report remote failure.
    pub fn fail_updates(&self, failing: bool) {
        self.failing_updates.store(failing, Ordering::SeqCst);
    }

    /// Toggle the health check result.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Every reschedule payload received so far.
    pub async fn recorded_updates(&self) -> Vec<ReschedulePayload> {
        self.updates.lock().await.clone()
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn find_patient_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<PatientRecord>, ClinioError> {
        Ok(self.patients.lock().await.get(phone).cloned())
    }

    async fn find_patient_by_carnet(
        &self,
        carnet: &str,
    ) -> Result<Option<PatientRecord>, ClinioError> {
        let patients = self.patients.lock().await;
        Ok(patients.values().find(|p| p.id == carnet).cloned())
    }

    async fn get_next_appointment(
        &self,
        patient_id: &str,
    ) -> Result<Option<AppointmentRecord>, ClinioError> {
        let patients = self.patients.lock().await;
        Ok(patients
            .values()
            .find(|p| p.id == patient_id)
            .and_then(|p| p.next_appointment.clone()))
    }

    async fn update_appointment(
        &self,
        payload: &ReschedulePayload,
    ) -> Result<Option<AppointmentRecord>, ClinioError> {
        self.updates.lock().await.push(payload.clone());
        if self.failing_updates.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(AppointmentRecord {
            id: format!("cita-{}", self.updates.lock().await.len()),
            scheduled_at: payload.scheduled_at,
            status: "Programado".to_string(),
            kind: payload.reason.clone(),
        }))
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
