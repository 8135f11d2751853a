//! Listening sessions
//!
//! A session is a maximal run of time-sorted plays in which no play starts
//! more than a gap threshold after the previous play ended. Sessions borrow
//! from the event list and are rebuilt on demand for each analysis.

use chrono::{Duration, NaiveDateTime};

use crate::event::{sorted_by_end_time, PlayEvent};

/// Gap in minutes used for session starters/closers and single-song sessions.
pub const DEFAULT_SESSION_GAP_MINUTES: i64 = 30;

/// Gap in minutes used for average session length and size.
pub const STATS_SESSION_GAP_MINUTES: i64 = 20;

/// An ordered, non-empty run of plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session<'a> {
    events: Vec<&'a PlayEvent>,
}

impl<'a> Session<'a> {
    fn starting_with(event: &'a PlayEvent) -> Self {
        Self {
            events: vec![event],
        }
    }

    /// Plays in this session, oldest first.
    #[must_use]
    pub fn events(&self) -> &[&'a PlayEvent] {
        &self.events
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// The play that opened the session.
    #[must_use]
    pub fn first(&self) -> &'a PlayEvent {
        self.events[0]
    }

    /// The play that closed the session.
    #[must_use]
    pub fn last(&self) -> &'a PlayEvent {
        self.events[self.events.len() - 1]
    }

    /// End time of the first play.
    #[must_use]
    pub fn started_at(&self) -> NaiveDateTime {
        self.first().end_time
    }

    /// End time of the last play.
    #[must_use]
    pub fn ended_at(&self) -> NaiveDateTime {
        self.last().end_time
    }

    /// Time between the first and the last play's end times.
    #[must_use]
    pub fn span(&self) -> Duration {
        self.ended_at() - self.started_at()
    }
}

/// Split `events` into sessions separated by gaps longer than `gap`.
///
/// Events are ordered by end time first (stable); the gap between two
/// neighbours is the later play's start time minus the earlier play's end
/// time. The concatenation of all sessions is exactly the sorted input.
#[must_use]
pub fn segment(events: &[PlayEvent], gap: Duration) -> Vec<Session<'_>> {
    let sorted = sorted_by_end_time(events);
    let mut iter = sorted.into_iter();

    let Some(first) = iter.next() else {
        return Vec::new();
    };

    let mut sessions = Vec::new();
    let mut current = Session::starting_with(first);
    let mut previous_end = first.end_time;

    for event in iter {
        if event.start_time() - previous_end > gap {
            sessions.push(std::mem::replace(&mut current, Session::starting_with(event)));
        } else {
            current.events.push(event);
        }
        previous_end = event.end_time;
    }

    sessions.push(current);
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, play};

    fn default_gap() -> Duration {
        Duration::minutes(DEFAULT_SESSION_GAP_MINUTES)
    }

    fn flatten<'a>(sessions: &[Session<'a>]) -> Vec<&'a PlayEvent> {
        sessions.iter().flat_map(|s| s.events().iter().copied()).collect()
    }

    #[test]
    fn test_empty_input_has_no_sessions() {
        assert!(segment(&[], default_gap()).is_empty());
    }

    #[test]
    fn test_single_event_is_one_session() {
        let events = vec![play("A", "S").build()];
        let sessions = segment(&events, default_gap());
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 1);
        assert_eq!(sessions[0].span(), Duration::zero());
    }

    #[test]
    fn test_gap_uses_start_of_next_play() {
        // Second play ends 40 minutes after the first, but lasted 15 minutes,
        // so it started only 25 minutes after the first ended.
        let t = at(2024, 5, 1, 8, 0);
        let events = vec![
            play("A", "one").ended(t).build(),
            play("A", "two").ended(t + Duration::minutes(40)).secs(15 * 60).build(),
        ];
        assert_eq!(segment(&events, default_gap()).len(), 1);
        assert_eq!(segment(&events, Duration::minutes(20)).len(), 2);
    }

    #[test]
    fn test_gap_equal_to_threshold_does_not_split() {
        let t = at(2024, 5, 1, 8, 0);
        let events = vec![
            play("A", "one").ended(t).secs(0).build(),
            play("A", "two").ended(t + Duration::minutes(30)).secs(0).build(),
        ];
        assert_eq!(segment(&events, Duration::minutes(30)).len(), 1);
    }

    #[test]
    fn test_partition_is_exact_and_sorted() {
        let t = at(2024, 5, 1, 8, 0);
        let events = vec![
            play("C", "late").ended(t + Duration::hours(5)).build(),
            play("A", "early").ended(t).build(),
            play("B", "mid").ended(t + Duration::minutes(4)).build(),
            play("D", "later").ended(t + Duration::hours(5) + Duration::minutes(3)).build(),
        ];
        let sessions = segment(&events, default_gap());
        assert_eq!(sessions.len(), 2);

        let flat = flatten(&sessions);
        let expected = sorted_by_end_time(&events);
        assert_eq!(flat, expected);
        assert_eq!(sessions[0].first().track_name, "early");
        assert_eq!(sessions[1].last().track_name, "later");
    }

    #[test]
    fn test_infinite_gap_gives_one_session() {
        let t = at(2024, 5, 1, 8, 0);
        let events: Vec<PlayEvent> = (0..10)
            .map(|i| play("A", "S").ended(t + Duration::days(i * 30)).build())
            .collect();
        let sessions = segment(&events, Duration::days(365_000));
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].len(), 10);
    }

    #[test]
    fn test_zero_gap_isolates_every_play() {
        let t = at(2024, 5, 1, 8, 0);
        let events: Vec<PlayEvent> = (0..4)
            .map(|i| play("A", "S").ended(t + Duration::minutes(i * 10)).secs(60).build())
            .collect();
        let sessions = segment(&events, Duration::zero());
        assert_eq!(sessions.len(), 4);
        assert!(sessions.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_segment_leaves_input_untouched() {
        let t = at(2024, 5, 1, 8, 0);
        let events = vec![
            play("B", "b").ended(t + Duration::hours(2)).build(),
            play("A", "a").ended(t).build(),
        ];
        let before = events.clone();
        let _ = segment(&events, default_gap());
        assert_eq!(events, before);
    }
}
