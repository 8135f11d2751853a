//! Headline numbers for the whole history

use chrono::NaiveDateTime;

use crate::date_range::DateRange;
use crate::event::PlayEvent;
use crate::types::Milliseconds;

/// Total listening time of the plays that ended inside `range`.
#[must_use]
pub fn play_time(events: &[PlayEvent], range: &DateRange) -> Milliseconds {
    events
        .iter()
        .filter(|e| range.contains(e.end_time))
        .map(|e| e.ms_played)
        .sum()
}

/// Earliest and latest end time in the history.
#[must_use]
pub fn history_range(events: &[PlayEvent]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let first = events.iter().map(|e| e.end_time).min()?;
    let last = events.iter().map(|e| e.end_time).max()?;
    Some((first, last))
}
