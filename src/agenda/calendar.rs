// src/agenda/calendar.rs

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::models::Appointment;

/// Six weeks of seven days.
pub const GRID_CELLS: usize = 42;

/// One cell of the month view. Rebuilt on every render, never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay<'a> {
    pub date: NaiveDate,
    pub is_current_month: bool,
    pub is_today: bool,
    pub appointments: Vec<&'a Appointment>,
}

/// First cell of the grid: the Sunday on or before the 1st of the month.
pub fn grid_start(reference: NaiveDate) -> NaiveDate {
    let first = reference.with_day(1).unwrap_or(reference);
    first - Duration::days(i64::from(first.weekday().num_days_from_sunday()))
}

/// Build the 42-cell month grid around `reference` (any date in the month).
pub fn month_grid<'a>(
    reference: NaiveDate,
    today: NaiveDate,
    appointments: &'a [Appointment],
) -> Vec<CalendarDay<'a>> {
    let start = grid_start(reference);

    let mut buckets: BTreeMap<NaiveDate, Vec<&'a Appointment>> = BTreeMap::new();
    for appt in appointments {
        buckets.entry(appt.date).or_default().push(appt);
    }

    start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| CalendarDay {
            date,
            is_current_month: date.year() == reference.year() && date.month() == reference.month(),
            is_today: date == today,
            appointments: buckets.remove(&date).unwrap_or_default(),
        })
        .collect()
}

/// [`month_grid`] with "today" taken from the local clock.
pub fn month_grid_now(reference: NaiveDate, appointments: &[Appointment]) -> Vec<CalendarDay<'_>> {
    month_grid(reference, Local::now().date_naive(), appointments)
}

/// One day's appointments in start-time order.
pub fn day_agenda(date: NaiveDate, appointments: &[Appointment]) -> Vec<&Appointment> {
    let mut day: Vec<&Appointment> = appointments.iter().filter(|a| a.date == date).collect();
    day.sort_by_key(|a| (a.start_time, a.end_time));
    day
}

/// Inclusive first/last day covered by the grid, used to size the fetch.
pub fn grid_range(reference: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = grid_start(reference);
    (start, start + Duration::days(GRID_CELLS as i64 - 1))
}

pub fn days_in_month(reference: NaiveDate) -> u32 {
    let (y, m) = (reference.year(), reference.month());
    let next = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(y, m, 1)) {
        (Some(next), Some(first)) => (next - first).num_days() as u32,
        _ => 31,
    }
}
