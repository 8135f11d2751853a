//! Session-derived aggregations
//!
//! Sessions are rebuilt from the plays on every call using the gap the
//! caller passes in.

use chrono::Duration;
use indexmap::IndexMap;

use super::{ranked, Ranking};
use crate::event::PlayEvent;
use crate::session::{segment, Session};
use crate::types::TrackKey;

/// Average shape of a listening session.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionStats {
    pub sessions: usize,
    /// Average minutes from the first play's end to the last play's end.
    pub avg_minutes: f64,
    pub avg_tracks: f64,
}

#[must_use]
pub fn session_analysis(events: &[PlayEvent], gap: Duration) -> SessionStats {
    let sessions = segment(events, gap);
    if sessions.is_empty() {
        return SessionStats::default();
    }

    let count = sessions.len() as f64;
    let minutes: f64 = sessions
        .iter()
        .map(|s| s.span().num_milliseconds() as f64 / 60_000.0)
        .sum();
    let tracks: usize = sessions.iter().map(Session::len).sum();

    SessionStats {
        sessions: sessions.len(),
        avg_minutes: minutes / count,
        avg_tracks: tracks as f64 / count,
    }
}

fn count_sessions_by(
    events: &[PlayEvent],
    gap: Duration,
    pick: impl Fn(&Session<'_>) -> TrackKey,
) -> Ranking<TrackKey> {
    let mut counts: IndexMap<TrackKey, u64> = IndexMap::new();
    for session in segment(events, gap) {
        *counts.entry(pick(&session)).or_default() += 1;
    }
    ranked(counts)
}

/// Tracks that most often open a session.
#[must_use]
pub fn session_starter(events: &[PlayEvent], gap: Duration) -> Ranking<TrackKey> {
    count_sessions_by(events, gap, |s| s.first().track_key())
}

/// Tracks that most often close a session.
#[must_use]
pub fn session_closer(events: &[PlayEvent], gap: Duration) -> Ranking<TrackKey> {
    count_sessions_by(events, gap, |s| s.last().track_key())
}

/// Number of sessions made of a single play.
#[must_use]
pub fn quick_fix(events: &[PlayEvent], gap: Duration) -> usize {
    segment(events, gap).iter().filter(|s| s.len() == 1).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{DEFAULT_SESSION_GAP_MINUTES, STATS_SESSION_GAP_MINUTES};
    use crate::test_support::{at, play, run_of};

    fn stats_gap() -> Duration {
        Duration::minutes(STATS_SESSION_GAP_MINUTES)
    }

    fn default_gap() -> Duration {
        Duration::minutes(DEFAULT_SESSION_GAP_MINUTES)
    }

    /// Two sessions: three plays in the morning, one lone play at night.
    fn two_sessions() -> Vec<PlayEvent> {
        let mut events = run_of("A", "opener", at(2024, 1, 1, 9, 0), 1);
        events.extend(run_of("B", "middle", at(2024, 1, 1, 9, 3), 1));
        events.extend(run_of("C", "closer", at(2024, 1, 1, 9, 6), 1));
        events.push(play("A", "opener").ended(at(2024, 1, 1, 22, 0)).build());
        events
    }

    #[test]
    fn test_session_analysis() {
        let stats = session_analysis(&two_sessions(), stats_gap());
        assert_eq!(stats.sessions, 2);
        // 9:03 to 9:09 is six minutes, the lone play adds zero.
        assert!((stats.avg_minutes - 3.0).abs() < 1e-9);
        assert!((stats.avg_tracks - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_session_analysis_empty() {
        let stats = session_analysis(&[], stats_gap());
        assert_eq!(stats, SessionStats::default());
        assert!(stats.avg_minutes.abs() < f64::EPSILON);
        assert!(stats.avg_tracks.abs() < f64::EPSILON);
    }

    #[test]
    fn test_starters_and_closers() {
        let events = two_sessions();
        assert_eq!(
            session_starter(&events, default_gap()),
            vec![(TrackKey::new("A", "opener"), 2)]
        );
        assert_eq!(
            session_closer(&events, default_gap()),
            vec![(TrackKey::new("C", "closer"), 1), (TrackKey::new("A", "opener"), 1)]
        );
    }

    #[test]
    fn test_quick_fix() {
        assert_eq!(quick_fix(&two_sessions(), default_gap()), 1);
        assert_eq!(quick_fix(&[], default_gap()), 0);
    }
}
