/// Weekly session types plus overlap and conflict detection
mod conflict;
mod time;

pub use conflict::{find_conflicts, sessions_overlap, windows_overlap};
pub use time::{is_valid_time, parse_minutes};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Day of the week on which a session repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a day name is not one of the seven full weekday names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWeekday(pub String);

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    /// Day names are case-sensitive (`"Monday"`, not `"monday"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.as_str() == s)
            .ok_or_else(|| UnknownWeekday(s.to_string()))
    }
}

/// One recurring weekly time block of a course.
///
/// Times are kept in the form the administrator entered them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
}

impl Session {
    pub fn new(day: Weekday, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            day,
            start_time: start_time.into(),
            end_time: end_time.into(),
        }
    }
}
