// src/agenda/time.rs

use chrono::{NaiveTime, Timelike};

use crate::error::ValidationError;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse a wall-clock time typed as `HH:MM` (seconds tolerated).
pub fn parse_hhmm(raw: &str) -> Result<NaiveTime, ValidationError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime(raw.to_string()))
}

pub fn format_hhmm(t: NaiveTime) -> String {
    format!("{:02}:{:02}", t.hour(), t.minute())
}

fn minutes_since_midnight(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

/// End of an appointment: start + duration on a 24h clock.
///
/// Wraps past midnight without any notion of the next day; callers that book
/// appointments go through [`booking_window`], which refuses that case.
pub fn end_time(start: NaiveTime, duration_min: u32) -> NaiveTime {
    let total = (minutes_since_midnight(start) + duration_min % MINUTES_PER_DAY) % MINUTES_PER_DAY;
    // total < 1440, so hour < 24 and minute < 60
    NaiveTime::from_hms_opt(total / 60, total % 60, 0).unwrap_or(NaiveTime::MIN)
}

/// Validated `[start, end)` for a new booking on a single calendar day.
pub fn booking_window(
    start: NaiveTime,
    duration_min: u32,
) -> Result<(NaiveTime, NaiveTime), ValidationError> {
    if duration_min == 0 {
        return Err(ValidationError::ZeroDuration);
    }
    if minutes_since_midnight(start).saturating_add(duration_min) >= MINUTES_PER_DAY {
        return Err(ValidationError::CrossesMidnight {
            start: format_hhmm(start),
        });
    }
    Ok((start, end_time(start, duration_min)))
}
