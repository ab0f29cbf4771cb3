//! Human-readable durations and timestamps for tables.

use chrono::{DateTime, Utc};

use crate::validation::parse_form_time;

/// How long a vehicle has been parked, e.g. `45 mins`, `2 hrs 5 mins`,
/// `3 days 4 hrs`. Entry times in the future count as zero.
pub fn parking_duration(entry_time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let total_mins = (now - entry_time).num_minutes().max(0);
    let hours = total_mins / 60;

    if hours < 1 {
        format!("{} mins", total_mins)
    } else if hours < 24 {
        format!("{} hrs {} mins", hours, total_mins % 60)
    } else {
        format!("{} days {} hrs", hours / 24, hours % 24)
    }
}

/// Span between two reservation timestamps as `<h>h <m>m`; `None` if either
/// side does not parse.
pub fn reservation_duration(start_time: &str, end_time: &str) -> Option<String> {
    let start = parse_form_time(start_time)?;
    let end = parse_form_time(end_time)?;
    let total_mins = (end - start).num_minutes();
    Some(format!("{}h {}m", total_mins / 60, total_mins % 60))
}

/// `YYYY-MM-DD HH:MM` when the backend timestamp parses, otherwise as sent.
pub fn format_date_time(raw: &str) -> String {
    match parse_form_time(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => raw.to_string(),
    }
}
