// src/billing/report.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::billing::balance::{Balance, reconcile};
use crate::models::{Payment, PaymentStatus, Quotation, QuotationStatus};

/// Cash summary over an inclusive date range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FinanceSummary {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub confirmed_cents: i64,
    pub pending_cents: i64,
    pub voided_count: usize,
    pub payment_count: usize,
    pub by_method: BTreeMap<Uuid, i64>,
}

pub fn summarize(payments: &[Payment], from: NaiveDate, to: NaiveDate) -> FinanceSummary {
    let mut summary = FinanceSummary {
        from: Some(from),
        to: Some(to),
        ..Default::default()
    };

    for p in payments
        .iter()
        .filter(|p| p.payment_date >= from && p.payment_date <= to)
    {
        summary.payment_count += 1;
        match p.status {
            PaymentStatus::Confirmed => {
                summary.confirmed_cents += p.amount_cents;
                *summary.by_method.entry(p.method_id).or_insert(0) += p.amount_cents;
            }
            PaymentStatus::Pending => summary.pending_cents += p.amount_cents,
            PaymentStatus::Voided => summary.voided_count += 1,
        }
    }
    summary
}

/// Quotations still owing money, largest balance first. Void quotations are
/// skipped.
pub fn outstanding(quotations: &[Quotation], payments: &[Payment]) -> Vec<Balance> {
    let mut open: Vec<Balance> = quotations
        .iter()
        .filter(|q| q.status != QuotationStatus::Void)
        .map(|q| reconcile(q, payments))
        .filter(|b| b.pending > 0)
        .collect();
    open.sort_by(|a, b| b.pending.cmp(&a.pending));
    open
}
