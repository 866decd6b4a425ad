// SPDX-FileCopyrightText: 2026 Clinio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Appointment slot validation and the single reschedule write.
//!
//! Validation is total and side-effect free; only a tuple that passes every
//! rule reaches the registry, and it does so in exactly one call. The
//! handler never retries: transient backend failures surface as `Ok(None)`
//! and the caller reports a generic error.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike, Weekday};
use tracing::{info, warn};

use clinio_config::model::ClinicConfig;
use clinio_core::types::{AppointmentRecord, ReschedulePayload};
use clinio_core::{ClinioError, RegistryClient};

use crate::replies;

/// Registry status id for a (re)programmed appointment.
const STATUS_PROGRAMMED: i64 = 1;

/// Clinic business rules, extracted from config once at composition time.
#[derive(Debug, Clone, Copy)]
pub struct ClinicRules {
    pub open_hour: u32,
    pub close_hour: u32,
    pub slot_minutes: u32,
    pub closed_weekday: Weekday,
    pub max_days_ahead: i64,
}

impl ClinicRules {
    pub fn from_config(config: &ClinicConfig) -> Self {
        Self {
            open_hour: config.open_hour,
            close_hour: config.close_hour,
            slot_minutes: config.slot_minutes,
            closed_weekday: config.closed_weekday(),
            max_days_ahead: config.max_days_ahead,
        }
    }
}

/// A slot rejection, with its user-facing explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotError {
    DateInPast,
    TooFarAhead { max_days: i64 },
    ClosedWeekday { weekday: Weekday },
    OutsideHours { open_hour: u32, close_hour: u32 },
    OffGrid { slot_minutes: u32 },
}

impl SlotError {
    /// The reply the user sees for this rejection.
    pub fn user_message(&self) -> String {
        match self {
            SlotError::DateInPast => {
                "La fecha no puede ser en el pasado. Por favor elige otra fecha.".to_string()
            }
            SlotError::TooFarAhead { max_days } => {
                format!("Solo puedes agendar citas hasta {max_days} días adelante.")
            }
            SlotError::ClosedWeekday { weekday } => format!(
                "No atendemos los {}. Por favor elige otro día.",
                replies::weekday_es(*weekday)
            ),
            SlotError::OutsideHours {
                open_hour,
                close_hour,
            } => format!(
                "El horario de atención es de {open_hour:02}:00 a {close_hour:02}:00. \
                 Por favor elige otra hora."
            ),
            SlotError::OffGrid { slot_minutes } => format!(
                "Las citas son cada {slot_minutes} minutos (ej: 10:00, 10:30). \
                 Por favor ajusta la hora."
            ),
        }
    }
}

/// Validate the date half of a slot.
pub fn validate_date(date: NaiveDate, today: NaiveDate, rules: &ClinicRules) -> Result<(), SlotError> {
    if date < today {
        return Err(SlotError::DateInPast);
    }
    if (date - today).num_days() > rules.max_days_ahead {
        return Err(SlotError::TooFarAhead {
            max_days: rules.max_days_ahead,
        });
    }
    if date.weekday() == rules.closed_weekday {
        return Err(SlotError::ClosedWeekday {
            weekday: rules.closed_weekday,
        });
    }
    Ok(())
}

/// Validate the time half of a slot: inside the opening window (upper bound
/// exclusive) and aligned to the slot grid.
pub fn validate_time(time: NaiveTime, rules: &ClinicRules) -> Result<(), SlotError> {
    if time.hour() < rules.open_hour || time.hour() >= rules.close_hour {
        return Err(SlotError::OutsideHours {
            open_hour: rules.open_hour,
            close_hour: rules.close_hour,
        });
    }
    if time.minute() % rules.slot_minutes != 0 {
        return Err(SlotError::OffGrid {
            slot_minutes: rules.slot_minutes,
        });
    }
    Ok(())
}

/// Validate a complete (date, time) tuple.
pub fn validate_slot(
    date: NaiveDate,
    time: NaiveTime,
    today: NaiveDate,
    rules: &ClinicRules,
) -> Result<(), SlotError> {
    validate_date(date, today, rules)?;
    validate_time(time, rules)?;
    Ok(())
}

/// Outcome of one reschedule attempt.
#[derive(Debug)]
pub enum RescheduleOutcome {
    /// The write went through; here is the updated record.
    Confirmed(AppointmentRecord),
    /// Validation rejected the tuple; nothing was written.
    Rejected(SlotError),
    /// Validation passed but the registry rejected or could not be reached.
    Failed,
}

/// Performs the validated reschedule write.
pub struct AppointmentScheduler {
    registry: Arc<dyn RegistryClient>,
    rules: ClinicRules,
}

impl AppointmentScheduler {
    pub fn new(registry: Arc<dyn RegistryClient>, rules: ClinicRules) -> Self {
        Self { registry, rules }
    }

    pub fn rules(&self) -> &ClinicRules {
        &self.rules
    }

    /// Validate the tuple and, if it passes, issue exactly one registry
    /// write. Remote failure is `Ok(None)`; no retry happens here.
    ///
    /// Repeated confirmations are not deduplicated at this level: the
    /// orchestrator clears the task state after one attempt, which is what
    /// prevents double submission within a session.
    pub async fn reschedule(
        &self,
        patient_id: &str,
        date: NaiveDate,
        time: NaiveTime,
        reason: &str,
        today: NaiveDate,
    ) -> Result<RescheduleOutcome, ClinioError> {
        if let Err(rejection) = validate_slot(date, time, today, &self.rules) {
            info!(
                patient_id,
                %date,
                %time,
                rejection = ?rejection,
                "reschedule rejected by validation"
            );
            return Ok(RescheduleOutcome::Rejected(rejection));
        }

        let payload = ReschedulePayload {
            patient_id: patient_id.to_string(),
            scheduled_at: date.and_time(time).and_utc(),
            reason: reason.to_string(),
            status_id: STATUS_PROGRAMMED,
        };

        info!(patient_id, %date, %time, "issuing reschedule write");
        match self.registry.update_appointment(&payload).await? {
            Some(record) => Ok(RescheduleOutcome::Confirmed(record)),
            None => {
                warn!(patient_id, "registry rejected or failed the reschedule write");
                Ok(RescheduleOutcome::Failed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> ClinicRules {
        ClinicRules {
            open_hour: 7,
            close_hour: 19,
            slot_minutes: 30,
            closed_weekday: Weekday::Sun,
            max_days_ahead: 90,
        }
    }

    fn monday() -> NaiveDate {
        // 2026-08-03 is a Monday.
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    #[test]
    fn past_date_is_rejected() {
        let today = monday();
        let yesterday = today.pred_opt().unwrap();
        assert_eq!(
            validate_date(yesterday, today, &rules()),
            Err(SlotError::DateInPast)
        );
        // Today itself is allowed.
        assert_eq!(validate_date(today, today, &rules()), Ok(()));
    }

    #[test]
    fn horizon_is_enforced() {
        let today = monday();
        let too_far = today + chrono::Duration::days(91);
        assert_eq!(
            validate_date(too_far, today, &rules()),
            Err(SlotError::TooFarAhead { max_days: 90 })
        );
    }

    #[test]
    fn closed_weekday_is_rejected() {
        let today = monday();
        let sunday = NaiveDate::from_ymd_opt(2026, 8, 9).unwrap();
        assert_eq!(sunday.weekday(), Weekday::Sun);
        assert_eq!(
            validate_date(sunday, today, &rules()),
            Err(SlotError::ClosedWeekday {
                weekday: Weekday::Sun
            })
        );
    }

    #[test]
    fn opening_hour_boundaries() {
        let rules = rules();
        // Lower bound inclusive.
        assert_eq!(
            validate_time(NaiveTime::from_hms_opt(7, 0, 0).unwrap(), &rules),
            Ok(())
        );
        // Upper bound exclusive.
        assert_eq!(
            validate_time(NaiveTime::from_hms_opt(19, 0, 0).unwrap(), &rules),
            Err(SlotError::OutsideHours {
                open_hour: 7,
                close_hour: 19
            })
        );
        assert_eq!(
            validate_time(NaiveTime::from_hms_opt(6, 30, 0).unwrap(), &rules),
            Err(SlotError::OutsideHours {
                open_hour: 7,
                close_hour: 19
            })
        );
    }

    #[test]
    fn slot_grid_alignment() {
        let rules = rules();
        assert_eq!(
            validate_time(NaiveTime::from_hms_opt(10, 30, 0).unwrap(), &rules),
            Ok(())
        );
        assert_eq!(
            validate_time(NaiveTime::from_hms_opt(10, 15, 0).unwrap(), &rules),
            Err(SlotError::OffGrid { slot_minutes: 30 })
        );
    }

    #[test]
    fn rejection_messages_are_user_facing() {
        assert!(SlotError::DateInPast.user_message().contains("pasado"));
        assert!(SlotError::ClosedWeekday {
            weekday: Weekday::Sun
        }
        .user_message()
        .contains("domingos"));
        assert!(SlotError::OffGrid { slot_minutes: 30 }
            .user_message()
            .contains("30 minutos"));
    }
}
