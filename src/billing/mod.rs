//! Quotation totals, payment reconciliation and cash reporting.

pub mod balance;
pub mod quotation;
pub mod report;

pub use balance::{Balance, BalanceStatus, reconcile, validate_payment};
pub use quotation::{QuotationDraft, QuotationLine, total_mismatch};
pub use report::{FinanceSummary, outstanding, summarize};

/// `85000` -> `"850.00"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

/// Parse an amount typed at the desk (`350`, `350.5`, `350.00`) into cents.
pub fn parse_amount(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    let (neg, digits) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));
    if whole.is_empty() || frac.len() > 2 || !whole.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac.parse().ok()?,
    };
    let cents = whole.checked_mul(100)?.checked_add(frac)?;
    Some(if neg { -cents } else { cents })
}
