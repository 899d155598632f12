// src/stores/payment_store.rs

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    billing::{Balance, reconcile, validate_payment},
    error::ValidationError,
    models::{Payment, PaymentStatus, Quotation},
    stores::{Resource, Store},
};

/// Body for `POST /payments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDraft {
    pub quotation_id: Uuid,
    pub amount_cents: i64,
    #[serde(with = "crate::models::calendar_date")]
    pub payment_date: NaiveDate,
    pub method_id: Uuid,
    pub created_by: Uuid,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PaymentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PaymentFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotation_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

impl Resource for Payment {
    const PATH: &'static str = "/payments";
    const LABEL: &'static str = "payment";
    type Draft = PaymentDraft;
    type Patch = PaymentPatch;
    type Filter = PaymentFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

pub type PaymentStore = Store<Payment>;

impl Store<Payment> {
    /// Balance of `quotation` against the payments loaded right now.
    pub async fn balance_of(&self, quotation: &Quotation) -> Balance {
        reconcile(quotation, &self.state.read().await.items)
    }

    /// Register a payment against `quotation`. The amount is checked against
    /// the pending balance computed from the loaded payments, so load the
    /// quotation's payments first. A rejected amount never reaches the network.
    pub async fn register(&self, quotation: &Quotation, draft: PaymentDraft) -> Option<Payment> {
        if draft.quotation_id != quotation.id {
            self.fail(ValidationError::Required("payment must target the selected quotation"))
                .await;
            return None;
        }

        let balance = self.balance_of(quotation).await;
        if let Err(e) = validate_payment(draft.amount_cents, quotation, &balance) {
            self.fail(e).await;
            return None;
        }

        tracing::info!(
            quotation_id = %quotation.id,
            amount = draft.amount_cents,
            pending = balance.pending,
            "registering payment"
        );
        self.create(&draft).await
    }

    /// Mark a payment voided; it stops counting toward the paid amount.
    pub async fn void(&self, id: Uuid) -> Option<Payment> {
        self.update(
            id,
            &PaymentPatch {
                status: Some(PaymentStatus::Voided),
            },
        )
        .await
    }
}
