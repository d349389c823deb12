//! Wall-clock time parsing for course sessions.

use regex::Regex;
use std::sync::LazyLock;

// Matches "2:30 PM", "2:30PM" or "14:30"
static TIME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})\s?(AM|PM)?$").unwrap());

/// Converts a wall-clock string into minutes since midnight.
///
/// Accepts both 12-hour (`"2:30 PM"`) and 24-hour (`"14:30"`) forms. With a
/// period marker, `12 AM` maps to hour 0 and `12 PM` stays at hour 12; any
/// other PM hour has 12 added. Without a marker the hour is taken as-is.
///
/// Only the shape of the string is checked, so values such as `"25:00"` or
/// `"9:75"` parse to minute counts past the end of the day.
///
/// # Returns
/// * `Some(minutes)` - If the string matches the expected pattern
/// * `None` - Otherwise
pub fn parse_minutes(value: &str) -> Option<u32> {
    let caps = TIME_REGEX.captures(value)?;

    let mut hours: u32 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u32 = caps.get(2)?.as_str().parse().ok()?;

    match caps.get(3).map(|m| m.as_str()) {
        Some("PM") if hours != 12 => hours += 12,
        Some("AM") if hours == 12 => hours = 0,
        _ => {}
    }

    Some(hours * 60 + minutes)
}

/// Returns true if the string has the shape of a session time.
pub fn is_valid_time(value: &str) -> bool {
    TIME_REGEX.is_match(value)
}
