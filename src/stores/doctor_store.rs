// src/stores/doctor_store.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stores::{Resource, Store};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<String>,
    pub license_number: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

impl Doctor {
    pub fn display_name(&self) -> String {
        format!("Dr. {} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDraft {
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DoctorPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DoctorFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for Doctor {
    const PATH: &'static str = "/doctors";
    const LABEL: &'static str = "doctor";
    type Draft = DoctorDraft;
    type Patch = DoctorPatch;
    type Filter = DoctorFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type DoctorStore = Store<Doctor>;
