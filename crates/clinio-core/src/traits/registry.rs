// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Clinic registry trait: the external patient/appointment system.

use async_trait::async_trait;

use crate::error::ClinioError;
use crate::types::{AppointmentRecord, PatientRecord, ReschedulePayload};

/// Typed read/write operations against the clinic's follow-up backend.
///
/// Implementations degrade remote and transport failures to `Ok(None)`
/// rather than erroring, so a flaky backend never aborts a dialogue turn.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Look up a patient by phone number.
    async fn find_patient_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<PatientRecord>, ClinioError>;

    /// Look up a patient by identity card number.
    async fn find_patient_by_carnet(
        &self,
        carnet: &str,
    ) -> Result<Option<PatientRecord>, ClinioError>;

    /// The patient's next scheduled appointment, if any.
    async fn get_next_appointment(
        &self,
        patient_id: &str,
    ) -> Result<Option<AppointmentRecord>, ClinioError>;

    /// Issue the reschedule write. Returns the updated record, or `None`
    /// when the backend rejected or could not be reached.
    async fn update_appointment(
        &self,
        payload: &ReschedulePayload,
    ) -> Result<Option<AppointmentRecord>, ClinioError>;

    /// Whether the backend currently responds.
    async fn health_check(&self) -> bool;
}
