// src/billing/balance.rs

use serde::Serialize;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::models::{Payment, PaymentStatus, Quotation, QuotationStatus};

/// Paid/pending view of one quotation. Derived on every read, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Balance {
    pub quotation_id: Uuid,
    pub total: i64,
    pub paid: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Pending,
    Partial,
    Paid,
}

impl BalanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BalanceStatus::Pending => "pending",
            BalanceStatus::Partial => "partial",
            BalanceStatus::Paid => "paid",
        }
    }
}

impl Balance {
    pub fn status(&self) -> BalanceStatus {
        if self.pending <= 0 {
            BalanceStatus::Paid
        } else if self.paid <= 0 {
            BalanceStatus::Pending
        } else {
            BalanceStatus::Partial
        }
    }

    /// More money recorded than the quotation asks for. Only bad upstream
    /// data gets here; it still classifies as paid.
    pub fn is_overpaid(&self) -> bool {
        self.pending < 0
    }
}

/// Sum the non-voided payments that target `quotation` out of the full,
/// unfiltered payment list.
pub fn reconcile(quotation: &Quotation, payments: &[Payment]) -> Balance {
    let paid: i64 = payments
        .iter()
        .filter(|p| p.quotation_id == quotation.id)
        .filter(|p| p.status != PaymentStatus::Voided)
        .map(|p| p.amount_cents)
        .sum();

    let balance = Balance {
        quotation_id: quotation.id,
        total: quotation.total_cents,
        paid,
        pending: quotation.total_cents - paid,
    };

    if balance.is_overpaid() {
        tracing::warn!(
            quotation_id = %quotation.id,
            total = balance.total,
            paid = balance.paid,
            "quotation is overpaid"
        );
    }
    balance
}

/// Gate for registering a payment; runs before any request is built.
pub fn validate_payment(
    amount: i64,
    quotation: &Quotation,
    balance: &Balance,
) -> Result<(), ValidationError> {
    if quotation.status == QuotationStatus::Void {
        return Err(ValidationError::QuotationVoid);
    }
    if amount <= 0 {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > balance.pending {
        return Err(ValidationError::ExceedsPending {
            amount,
            pending: balance.pending.max(0),
        });
    }
    Ok(())
}
