//! Date range utilities for narrowing the history before analysis.
//!
//! A `DateRange` is an inclusive window of calendar days. Plays are kept
//! when the date of their end time falls inside the window.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{Error, Result};
use crate::event::PlayEvent;

/// A date range for filtering plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    /// Start date (inclusive), or None for no lower bound
    pub start: Option<NaiveDate>,
    /// End date (inclusive), or None for no upper bound
    pub end: Option<NaiveDate>,
    /// Human-readable name for this period (e.g., "All Time", "2024")
    pub display_name: String,
}

impl DateRange {
    /// Create a new date range with the given bounds and display name.
    #[must_use]
    pub fn new(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            start,
            end,
            display_name: display_name.into(),
        }
    }

    /// Create an unbounded date range (all time).
    #[must_use]
    pub fn all_time() -> Self {
        Self::new(None, None, "All Time")
    }

    /// Create a date range for a specific calendar year.
    #[must_use]
    pub fn year(year: i32) -> Self {
        let start = NaiveDate::from_ymd_opt(year, 1, 1);
        let end = NaiveDate::from_ymd_opt(year, 12, 31);
        Self::new(start, end, year.to_string())
    }

    /// Create a range between two optional dates.
    ///
    /// The display name reads like "2021-01-01 to 2021-06-30", with an open
    /// side shown as "start" or "now".
    pub fn between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(Error::config(format!("start date {s} is after end date {e}")));
            }
        }
        let from = start.map_or_else(|| "start".to_string(), |d| d.to_string());
        let to = end.map_or_else(|| "now".to_string(), |d| d.to_string());
        Ok(Self::new(start, end, format!("{from} to {to}")))
    }

    /// Check if this is an unbounded (all time) range.
    #[must_use]
    pub const fn is_all_time(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Whether `time` falls on a day inside the range.
    #[must_use]
    pub fn contains(&self, time: NaiveDateTime) -> bool {
        let day = time.date();
        self.start.map_or(true, |s| day >= s) && self.end.map_or(true, |e| day <= e)
    }

    /// Keep only the plays inside the range, preserving their order.
    #[must_use]
    pub fn apply(&self, events: Vec<PlayEvent>) -> Vec<PlayEvent> {
        if self.is_all_time() {
            return events;
        }
        events
            .into_iter()
            .filter(|e| self.contains(e.end_time))
            .collect()
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::all_time()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Parse a `YYYY-MM-DD` date given on the command line.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| Error::config(format!("invalid date '{value}': {e}")))
}

/// Build a date range from CLI flags.
///
/// # Priority
///
/// Flags are checked in order: all_time > year > from/to > default (all time)
pub fn from_cli_flags(
    all_time: bool,
    year: Option<i32>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<DateRange> {
    if all_time {
        Ok(DateRange::all_time())
    } else if let Some(y) = year {
        Ok(DateRange::year(y))
    } else if from.is_some() || to.is_some() {
        DateRange::between(from, to)
    } else {
        Ok(DateRange::all_time())
    }
}
