// src/stores/service_store.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stores::{Resource, Store};

/// A treatment from the clinic's service catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub display_number: Option<i32>,
    pub display_name: String,
    /// Booking length; drives appointment end times.
    pub duration_min: u32,
    pub price_cents: i64,
    #[serde(default)]
    pub disclaimer: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDraft {
    pub display_name: String,
    pub duration_min: u32,
    pub price_cents: i64,
    pub disclaimer: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ServicePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ServiceFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl Resource for Service {
    const PATH: &'static str = "/services";
    const LABEL: &'static str = "service";
    type Draft = ServiceDraft;
    type Patch = ServicePatch;
    type Filter = ServiceFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type ServiceStore = Store<Service>;

/// Duration of `service_id` in a loaded catalog.
pub fn duration_of(services: &[Service], service_id: Uuid) -> Option<u32> {
    services
        .iter()
        .find(|s| s.id == service_id)
        .map(|s| s.duration_min)
}
