//! Agenda logic: month grid, appointment times, overlaps and status rules.
//!
//! Everything here is a pure function over snapshots taken from the stores.

pub mod calendar;
pub mod conflicts;
pub mod lifecycle;
pub mod time;

pub use calendar::{CalendarDay, GRID_CELLS, day_agenda, month_grid, month_grid_now};
pub use conflicts::{Conflict, ConflictKind, SlotRequest, find_conflicts};
pub use lifecycle::{AppointmentAction, AppointmentDraft, RescheduleRequest, ensure_transition};
pub use time::{booking_window, end_time, format_hhmm, parse_hhmm};
