// src/billing/quotation.rs

use serde::Serialize;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{Quotation, QuotationItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationLine {
    pub service_id: Uuid,
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

/// Body for `POST /quotations`: subtotals and total are filled in here so the
/// total always equals the sum of the lines.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuotationDraft {
    pub patient_id: Uuid,
    pub items: Vec<QuotationItem>,
    pub total_cents: i64,
}

pub fn subtotal(quantity: u32, unit_price_cents: i64) -> i64 {
    i64::from(quantity) * unit_price_cents
}

impl QuotationDraft {
    pub fn new(patient_id: Uuid, lines: Vec<QuotationLine>) -> Result<Self, ValidationError> {
        if lines.is_empty() {
            return Err(ValidationError::Required("a quotation needs at least one item"));
        }

        let items: Vec<QuotationItem> = lines
            .into_iter()
            .map(|l| {
                if l.quantity == 0 {
                    return Err(ValidationError::NonPositiveQuantity);
                }
                Ok(QuotationItem {
                    service_id: l.service_id,
                    description: l.description,
                    quantity: l.quantity,
                    unit_price_cents: l.unit_price_cents,
                    subtotal_cents: subtotal(l.quantity, l.unit_price_cents),
                })
            })
            .collect::<Result<_, _>>()?;

        let total_cents = items.iter().map(|i| i.subtotal_cents).sum();
        Ok(Self {
            patient_id,
            items,
            total_cents,
        })
    }
}

/// Difference between the stated total and the sum of the item subtotals,
/// when they disagree. Reconciliation trusts the stated total regardless.
pub fn total_mismatch(q: &Quotation) -> Option<i64> {
    if q.items.is_empty() {
        return None;
    }
    let sum: i64 = q.items.iter().map(|i| i.subtotal_cents).sum();
    (sum != q.total_cents).then_some(q.total_cents - sum)
}
