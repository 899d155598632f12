// src/stores/patient_store.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::stores::{Resource, Store};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub register_number: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Patient {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PatientDraft {
    pub first_name: String,
    pub last_name: String,
    pub document_number: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl PatientDraft {
    /// Trim the form fields and insist on a name.
    pub fn validated(mut self) -> Result<Self, ValidationError> {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        if self.first_name.is_empty() || self.last_name.is_empty() {
            return Err(ValidationError::Required("first_name and last_name are required"));
        }
        let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self.document_number = clean(self.document_number);
        self.phone = clean(self.phone);
        self.email = clean(self.email);
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatientFilter {
    /// Matches register number, names or document number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl Resource for Patient {
    const PATH: &'static str = "/patients";
    const LABEL: &'static str = "patient";
    type Draft = PatientDraft;
    type Patch = PatientPatch;
    type Filter = PatientFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type PatientStore = Store<Patient>;

impl Store<Patient> {
    pub async fn register(&self, draft: PatientDraft) -> Option<Patient> {
        match draft.validated() {
            Ok(draft) => self.create(&draft).await,
            Err(e) => {
                self.fail(e).await;
                None
            }
        }
    }

    /// Names by id, for views that show patients next to other records.
    pub async fn names(&self) -> std::collections::HashMap<Uuid, String> {
        self.state
            .read()
            .await
            .items
            .iter()
            .map(|p| (p.id, p.display_name()))
            .collect()
    }
}
