// src/stores/quotation_store.rs

use serde::Serialize;
use uuid::Uuid;

use crate::{
    billing::QuotationDraft,
    error::ValidationError,
    models::{Quotation, QuotationStatus},
    stores::{Resource, Store},
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct QuotationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QuotationStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuotationFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<QuotationStatus>,
}

impl Resource for Quotation {
    const PATH: &'static str = "/quotations";
    const LABEL: &'static str = "quotation";
    type Draft = QuotationDraft;
    type Patch = QuotationPatch;
    type Filter = QuotationFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type QuotationStore = Store<Quotation>;

impl Store<Quotation> {
    async fn set_status(
        &self,
        id: Uuid,
        action: &'static str,
        allowed_from: &[QuotationStatus],
        to: QuotationStatus,
    ) -> Option<Quotation> {
        let Some(current) = self.find(id).await else {
            self.fail(ValidationError::NotLoaded("quotation")).await;
            return None;
        };
        if !allowed_from.contains(&current.status) {
            self.fail(ValidationError::IllegalTransition {
                subject: "quotation",
                action,
                status: status_str(current.status),
            })
            .await;
            return None;
        }
        self.update(id, &QuotationPatch { status: Some(to) }).await
    }

    pub async fn accept(&self, id: Uuid) -> Option<Quotation> {
        self.set_status(id, "accept", &[QuotationStatus::Pending], QuotationStatus::Accepted)
            .await
    }

    pub async fn void(&self, id: Uuid) -> Option<Quotation> {
        self.set_status(
            id,
            "void",
            &[QuotationStatus::Pending, QuotationStatus::Accepted],
            QuotationStatus::Void,
        )
        .await
    }
}

fn status_str(s: QuotationStatus) -> &'static str {
    match s {
        QuotationStatus::Pending => "pending",
        QuotationStatus::Accepted => "accepted",
        QuotationStatus::Paid => "paid",
        QuotationStatus::Void => "void",
    }
}
