// src/agenda/conflicts.rs

use chrono::{NaiveDate, NaiveTime};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentStatus};

/// The slot someone is trying to book or move an appointment into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotRequest {
    /// Set when rescheduling, so the appointment does not clash with itself.
    pub appointment_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The doctor already has something in that slot.
    Doctor,
    /// The patient is already booked in that slot, with any doctor.
    Patient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conflict<'a> {
    pub kind: ConflictKind,
    pub with: &'a Appointment,
}

impl From<&Appointment> for SlotRequest {
    fn from(a: &Appointment) -> Self {
        SlotRequest {
            appointment_id: Some(a.id),
            patient_id: a.patient_id,
            doctor_id: a.doctor_id,
            date: a.date,
            start_time: a.start_time,
            end_time: a.end_time,
        }
    }
}

/// Half-open intervals: 09:00-09:30 and 09:30-10:00 do not overlap.
fn overlaps(a_start: NaiveTime, a_end: NaiveTime, b_start: NaiveTime, b_end: NaiveTime) -> bool {
    a_start < b_end && b_start < a_end
}

/// Naive overlap check against whatever appointments are loaded.
///
/// Cancelled appointments free their slot. A doctor clash is reported once
/// even when the same appointment also involves the patient.
pub fn find_conflicts<'a>(slot: &SlotRequest, existing: &'a [Appointment]) -> Vec<Conflict<'a>> {
    existing
        .iter()
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .filter(|a| Some(a.id) != slot.appointment_id)
        .filter(|a| a.date == slot.date)
        .filter(|a| overlaps(slot.start_time, slot.end_time, a.start_time, a.end_time))
        .filter_map(|a| {
            let kind = if a.doctor_id == slot.doctor_id {
                ConflictKind::Doctor
            } else if a.patient_id == slot.patient_id {
                ConflictKind::Patient
            } else {
                return None;
            };
            Some(Conflict { kind, with: a })
        })
        .collect()
}
