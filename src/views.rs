// src/views.rs
//
// Text projections of store snapshots. Nothing here touches the network.

use std::collections::HashMap;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};
use uuid::Uuid;

use crate::{
    agenda::{CalendarDay, GRID_CELLS, format_hhmm},
    billing::{Balance, FinanceSummary, format_cents},
    models::Appointment,
};

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Six rows of seven cells. Days outside the month are dimmed to `.`,
/// today is bracketed and a day with bookings shows their count.
pub fn render_month(reference: NaiveDate, grid: &[CalendarDay<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", reference.format("%B %Y"));
    let header: Vec<String> = WEEKDAYS.iter().map(|d| format!("{d:>7}")).collect();
    let _ = writeln!(out, "{}", header.concat());

    for week in grid.chunks(7).take(GRID_CELLS / 7) {
        let row: Vec<String> = week.iter().map(render_cell).collect();
        let _ = writeln!(out, "{}", row.concat());
    }
    out
}

fn render_cell(day: &CalendarDay<'_>) -> String {
    if !day.is_current_month {
        return format!("{:>7}", ".");
    }
    let mut cell = if day.is_today {
        format!("[{}]", day.date.day())
    } else {
        day.date.day().to_string()
    };
    if !day.appointments.is_empty() {
        let _ = write!(cell, "*{}", day.appointments.len());
    }
    format!("{cell:>7}")
}

/// One line per appointment: time range, patient, status.
pub fn render_day(
    date: NaiveDate,
    appointments: &[&Appointment],
    patient_names: &HashMap<Uuid, String>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", date.format("%A %Y-%m-%d"));
    if appointments.is_empty() {
        out.push_str("  no appointments\n");
        return out;
    }
    for a in appointments {
        let patient = patient_names
            .get(&a.patient_id)
            .map(String::as_str)
            .unwrap_or("unknown patient");
        let _ = writeln!(
            out,
            "  {}-{}  {:<28} {}",
            format_hhmm(a.start_time),
            format_hhmm(a.end_time),
            patient,
            a.status.as_str()
        );
    }
    out
}

pub fn render_balances(balances: &[Balance]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36} {:>12} {:>12} {:>12}  status",
        "quotation", "total", "paid", "pending"
    );
    for b in balances {
        let _ = writeln!(
            out,
            "{:<36} {:>12} {:>12} {:>12}  {}",
            b.quotation_id,
            format_cents(b.total),
            format_cents(b.paid),
            format_cents(b.pending),
            balance_label(b)
        );
    }
    out
}

/// Status word, flagged when more was paid than the quotation total.
fn balance_label(b: &Balance) -> String {
    if b.is_overpaid() {
        format!("{} (overpaid)", b.status().as_str())
    } else {
        b.status().as_str().to_string()
    }
}

pub fn render_summary(summary: &FinanceSummary) -> String {
    let mut out = String::new();
    if let (Some(from), Some(to)) = (summary.from, summary.to) {
        let _ = writeln!(out, "payments {from} .. {to}");
    }
    let _ = writeln!(out, "  confirmed  {:>12}", format_cents(summary.confirmed_cents));
    let _ = writeln!(out, "  pending    {:>12}", format_cents(summary.pending_cents));
    let _ = writeln!(
        out,
        "  count      {:>12}  ({} voided)",
        summary.payment_count, summary.voided_count
    );
    for (method, cents) in &summary.by_method {
        let _ = writeln!(out, "  {method}  {:>12}", format_cents(*cents));
    }
    out
}
