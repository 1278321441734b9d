use crate::utils::constants::{EPOCH_UNIX_SECONDS, SECONDS_PER_HOUR};
use chrono::{DateTime, Utc};

/// Convert an hour offset from the dataset epoch to a UTC datetime
pub fn hours_to_datetime(hours: i64) -> Option<DateTime<Utc>> {
    let seconds = hours.checked_mul(SECONDS_PER_HOUR)?.checked_add(EPOCH_UNIX_SECONDS)?;
    DateTime::from_timestamp(seconds, 0)
}

/// Render an hour offset for display, falling back to the raw number
pub fn format_hours(hours: i64) -> String {
    match hours_to_datetime(hours) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => format!("{}h", hours),
    }
}
