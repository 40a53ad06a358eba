//! Check-in date used by the lodging widget on every page of a run.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use eventpages_shared::{EventPagesError, Result};

/// How the run-wide check-in date is derived from today's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckinPolicy {
    /// Check in on the day of generation.
    Today,
    /// Check in on the next given weekday, today included.
    Next(Weekday),
}

impl Default for CheckinPolicy {
    fn default() -> Self {
        Self::Next(Weekday::Sat)
    }
}

impl CheckinPolicy {
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match *self {
            Self::Today => today,
            Self::Next(weekday) => {
                let ahead = (7 + weekday.num_days_from_monday()
                    - today.weekday().num_days_from_monday())
                    % 7;
                today + Days::new(u64::from(ahead))
            }
        }
    }
}

impl FromStr for CheckinPolicy {
    type Err = EventPagesError;

    fn from_str(s: &str) -> Result<Self> {
        let value = s.trim();
        if value.eq_ignore_ascii_case("today") {
            return Ok(Self::Today);
        }

        value.parse::<Weekday>().map(Self::Next).map_err(|_| {
            EventPagesError::config(format!(
                "site.checkin '{s}' must be \"today\" or a weekday name"
            ))
        })
    }
}

impl fmt::Display for CheckinPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Next(weekday) => write!(f, "next {weekday}"),
        }
    }
}
