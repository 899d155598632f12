// src/stores/sale_store.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    billing::quotation::subtotal,
    error::ValidationError,
    stores::{Resource, Store},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Pending,
    Completed,
    Cancelled,
    Refunded,
}

impl SaleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SaleStatus::Pending => "pending",
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
            SaleStatus::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleItem {
    /// Inventory item sold over the counter.
    pub item_id: Uuid,
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub subtotal_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub patient_id: Option<Uuid>,
    #[serde(default)]
    pub items: Vec<SaleItem>,
    pub total_cents: i64,
    pub status: SaleStatus,
    pub invoice_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Body for `POST /sales`; the total is the sum of the line subtotals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleDraft {
    pub patient_id: Option<Uuid>,
    pub items: Vec<SaleItem>,
    pub total_cents: i64,
}

impl SaleDraft {
    /// `lines` are `(item_id, description, quantity, unit_price_cents)`.
    pub fn new(
        patient_id: Option<Uuid>,
        lines: Vec<(Uuid, Option<String>, u32, i64)>,
    ) -> Result<Self, ValidationError> {
        if lines.is_empty() {
            return Err(ValidationError::Required("a sale needs at least one item"));
        }
        let mut items = Vec::with_capacity(lines.len());
        for (item_id, description, quantity, unit_price_cents) in lines {
            if quantity == 0 {
                return Err(ValidationError::NonPositiveQuantity);
            }
            items.push(SaleItem {
                item_id,
                description,
                quantity,
                unit_price_cents,
                subtotal_cents: subtotal(quantity, unit_price_cents),
            });
        }
        let total_cents = items.iter().map(|i| i.subtotal_cents).sum();
        Ok(Self {
            patient_id,
            items,
            total_cents,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SalePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SaleFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SaleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<Uuid>,
}

impl Resource for Sale {
    const PATH: &'static str = "/sales";
    const LABEL: &'static str = "sale";
    type Draft = SaleDraft;
    type Patch = SalePatch;
    type Filter = SaleFilter;

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleAction {
    Complete,
    Cancel,
    Refund,
    Invoice,
}

impl SaleAction {
    fn endpoint(self) -> &'static str {
        match self {
            SaleAction::Complete => "complete",
            SaleAction::Cancel => "cancel",
            SaleAction::Refund => "refund",
            SaleAction::Invoice => "invoice",
        }
    }
}

/// Pending sales get completed or cancelled; completed ones can be refunded
/// or invoiced once.
pub fn ensure_sale_action(sale: &Sale, action: SaleAction) -> Result<(), ValidationError> {
    let ok = match action {
        SaleAction::Complete | SaleAction::Cancel => sale.status == SaleStatus::Pending,
        SaleAction::Refund => sale.status == SaleStatus::Completed,
        SaleAction::Invoice => {
            sale.status == SaleStatus::Completed && sale.invoice_number.is_none()
        }
    };
    if ok {
        Ok(())
    } else {
        Err(ValidationError::IllegalTransition {
            subject: "sale",
            action: action.endpoint(),
            status: if action == SaleAction::Invoice && sale.invoice_number.is_some() {
                "already invoiced"
            } else {
                sale.status.as_str()
            },
        })
    }
}

pub type SaleStore = Store<Sale>;

impl Store<Sale> {
    async fn sale_action(&self, id: Uuid, action: SaleAction) -> Option<Sale> {
        let Some(current) = self.find(id).await else {
            self.fail(ValidationError::NotLoaded("sale")).await;
            return None;
        };
        if let Err(e) = ensure_sale_action(&current, action) {
            self.fail(e).await;
            return None;
        }
        self.perform(id, action.endpoint(), &serde_json::json!({}))
            .await
    }

    pub async fn complete_sale(&self, id: Uuid) -> Option<Sale> {
        self.sale_action(id, SaleAction::Complete).await
    }

    pub async fn cancel_sale(&self, id: Uuid) -> Option<Sale> {
        self.sale_action(id, SaleAction::Cancel).await
    }

    pub async fn refund(&self, id: Uuid) -> Option<Sale> {
        self.sale_action(id, SaleAction::Refund).await
    }

    /// Ask the backend to issue the invoice; the number comes back on the sale.
    pub async fn generate_invoice(&self, id: Uuid) -> Option<Sale> {
        self.sale_action(id, SaleAction::Invoice).await
    }
}
