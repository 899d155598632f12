// src/agenda/lifecycle.rs

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::agenda::time::booking_window;
use crate::error::ValidationError;
use crate::models::{Appointment, AppointmentStatus};

/// Actions the agenda exposes on a booked appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentAction {
    Confirm,
    Complete,
    Cancel,
    NoShow,
    Reschedule,
}

impl AppointmentAction {
    /// Path segment of the matching `POST /appointments/{id}/...` endpoint.
    pub fn endpoint(self) -> &'static str {
        match self {
            AppointmentAction::Confirm => "confirm",
            AppointmentAction::Complete => "complete",
            AppointmentAction::Cancel => "cancel",
            AppointmentAction::NoShow => "no_show",
            AppointmentAction::Reschedule => "reschedule",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            AppointmentAction::Confirm => "confirm",
            AppointmentAction::Complete => "complete",
            AppointmentAction::Cancel => "cancel",
            AppointmentAction::NoShow => "mark as no-show",
            AppointmentAction::Reschedule => "reschedule",
        }
    }
}

/// Only scheduled appointments move; completed, cancelled and no-show are final.
pub fn ensure_transition(
    status: AppointmentStatus,
    action: AppointmentAction,
) -> Result<(), ValidationError> {
    match status {
        AppointmentStatus::Scheduled => Ok(()),
        other => Err(ValidationError::IllegalTransition {
            subject: "appointment",
            action: action.verb(),
            status: other.as_str(),
        }),
    }
}

/// Body for `POST /appointments`. Built only through [`AppointmentDraft::book`]
/// so `end_time` always follows from the service duration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentDraft {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub service_id: Uuid,
    #[serde(with = "crate::models::calendar_date")]
    pub date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::models::hhmm")]
    pub end_time: NaiveTime,
    pub notes: Option<String>,
}

impl AppointmentDraft {
    pub fn book(
        patient_id: Uuid,
        doctor_id: Uuid,
        service_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_min: u32,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        let (start_time, end_time) = booking_window(start_time, duration_min)?;
        Ok(Self {
            patient_id,
            doctor_id,
            service_id,
            date,
            start_time,
            end_time,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        })
    }
}

/// Body for `POST /appointments/{id}/reschedule`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RescheduleRequest {
    #[serde(with = "crate::models::calendar_date")]
    pub date: NaiveDate,
    #[serde(with = "crate::models::hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::models::hhmm")]
    pub end_time: NaiveTime,
}

impl RescheduleRequest {
    pub fn for_appointment(
        appt: &Appointment,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_min: u32,
    ) -> Result<Self, ValidationError> {
        ensure_transition(appt.status, AppointmentAction::Reschedule)?;
        let (start_time, end_time) = booking_window(start_time, duration_min)?;
        Ok(Self {
            date,
            start_time,
            end_time,
        })
    }
}
