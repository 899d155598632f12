// src/stores/appointment_store.rs

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    agenda::{
        AppointmentAction, AppointmentDraft, RescheduleRequest, SlotRequest, calendar,
        ensure_transition, find_conflicts, format_hhmm,
    },
    error::ValidationError,
    models::{Appointment, AppointmentStatus},
    stores::{Resource, Store},
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppointmentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AppointmentStatus>,
}

impl Resource for Appointment {
    const PATH: &'static str = "/appointments";
    const LABEL: &'static str = "appointment";
    type Draft = AppointmentDraft;
    type Patch = AppointmentPatch;
    type Filter = AppointmentFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type AppointmentStore = Store<Appointment>;

fn slot_taken(start: NaiveTime, end: NaiveTime) -> ValidationError {
    ValidationError::SlotTaken {
        start: format_hhmm(start),
        end: format_hhmm(end),
    }
}

impl Store<Appointment> {
    /// Load everything the month grid around `reference` can show, keeping
    /// the doctor/patient/status part of the current filter.
    pub async fn load_month(&self, reference: NaiveDate) -> bool {
        let (from, to) = calendar::grid_range(reference);
        let mut filter = self.state.read().await.filter.clone();
        filter.from = Some(from);
        filter.to = Some(to);
        self.search(filter).await
    }

    pub async fn load_day(&self, date: NaiveDate) -> bool {
        let mut filter = self.state.read().await.filter.clone();
        filter.from = Some(date);
        filter.to = Some(date);
        self.search(filter).await
    }

    /// Book a slot after checking it against the loaded appointments.
    pub async fn book(&self, draft: AppointmentDraft) -> Option<Appointment> {
        let slot = SlotRequest {
            appointment_id: None,
            patient_id: draft.patient_id,
            doctor_id: draft.doctor_id,
            date: draft.date,
            start_time: draft.start_time,
            end_time: draft.end_time,
        };

        let clash = {
            let s = self.state.read().await;
            !find_conflicts(&slot, &s.items).is_empty()
        };
        if clash {
            self.fail(slot_taken(slot.start_time, slot.end_time)).await;
            return None;
        }
        self.create(&draft).await
    }

    async fn transition(&self, id: Uuid, action: AppointmentAction) -> Option<Appointment> {
        let Some(current) = self.find(id).await else {
            self.fail(ValidationError::NotLoaded("appointment")).await;
            return None;
        };
        if let Err(e) = ensure_transition(current.status, action) {
            self.fail(e).await;
            return None;
        }
        self.perform(id, action.endpoint(), &serde_json::json!({}))
            .await
    }

    pub async fn confirm(&self, id: Uuid) -> Option<Appointment> {
        self.transition(id, AppointmentAction::Confirm).await
    }

    pub async fn complete(&self, id: Uuid) -> Option<Appointment> {
        self.transition(id, AppointmentAction::Complete).await
    }

    /// Cancellation is a status change; [`Store::delete`] is the hard delete.
    pub async fn cancel_appointment(&self, id: Uuid) -> Option<Appointment> {
        self.transition(id, AppointmentAction::Cancel).await
    }

    pub async fn mark_no_show(&self, id: Uuid) -> Option<Appointment> {
        self.transition(id, AppointmentAction::NoShow).await
    }

    /// Move an appointment; the end time is recomputed from `duration_min`.
    pub async fn reschedule(
        &self,
        id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        duration_min: u32,
    ) -> Option<Appointment> {
        let checked = {
            let s = self.state.read().await;
            match s.find(id) {
                None => Err(ValidationError::NotLoaded("appointment")),
                Some(current) => {
                    RescheduleRequest::for_appointment(current, date, start_time, duration_min)
                        .and_then(|req| {
                            let mut slot = SlotRequest::from(current);
                            slot.date = req.date;
                            slot.start_time = req.start_time;
                            slot.end_time = req.end_time;
                            if find_conflicts(&slot, &s.items).is_empty() {
                                Ok(req)
                            } else {
                                Err(slot_taken(req.start_time, req.end_time))
                            }
                        })
                }
            }
        };

        match checked {
            Ok(req) => {
                self.perform(id, AppointmentAction::Reschedule.endpoint(), &req)
                    .await
            }
            Err(e) => {
                self.fail(e).await;
                None
            }
        }
    }
}
