//! Streak and gap detection over chronologically sorted plays
//!
//! Every detector walks the plays once, oldest first, keeping a current run.
//! When the run breaks it is compared against the best run so far and only
//! replaces it when strictly longer, so the earliest of equal runs wins.
//! The run still open at the end of the history is compared as well.

use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use indexmap::IndexMap;

use super::{ranked, Ranking};
use crate::event::{sorted_by_end_time, PlayEvent};
use crate::types::{AlbumKey, TrackKey};

/// Minimum run length for an album to count as listened to in order.
const ALBUM_LOYALTY_MIN_RUN: usize = 3;

/// Keeps the strictly longest run seen so far.
struct Longest<M, T> {
    measure: M,
    item: Option<T>,
}

impl<M: PartialOrd + Copy, T> Longest<M, T> {
    /// Runs must measure more than `floor` to be kept.
    fn above(floor: M) -> Self {
        Self {
            measure: floor,
            item: None,
        }
    }

    fn offer(&mut self, measure: M, item: impl FnOnce() -> T) {
        if measure > self.measure {
            self.measure = measure;
            self.item = Some(item());
        }
    }

    fn into_inner(self) -> Option<(M, T)> {
        let measure = self.measure;
        self.item.map(|item| (measure, item))
    }
}

/// The track played the most times back to back, with the run length.
#[must_use]
pub fn most_consecutive_plays(events: &[PlayEvent]) -> Option<(TrackKey, usize)> {
    let sorted = sorted_by_end_time(events);
    let mut longest = Longest::above(0);
    let mut run: Option<(&PlayEvent, usize)> = None;

    for event in sorted {
        run = match run {
            Some((head, count)) if same_track(head, event) => Some((head, count + 1)),
            Some((head, count)) => {
                longest.offer(count, || head.track_key());
                Some((event, 1))
            }
            None => Some((event, 1)),
        };
    }
    if let Some((head, count)) = run {
        longest.offer(count, || head.track_key());
    }

    longest.into_inner().map(|(count, track)| (track, count))
}

fn same_track(a: &PlayEvent, b: &PlayEvent) -> bool {
    a.artist_name == b.artist_name && a.track_name == b.track_name
}

fn same_album(a: &PlayEvent, b: &PlayEvent) -> bool {
    a.artist_name == b.artist_name && a.album_name == b.album_name
}

/// How often at least three plays in a row came from the same album.
///
/// Plays without an album name never extend a run.
#[must_use]
pub fn album_loyalty(events: &[PlayEvent]) -> Ranking<AlbumKey> {
    let mut runs: IndexMap<AlbumKey, u64> = IndexMap::new();
    let mut current: Option<(&PlayEvent, usize)> = None;

    let mut close = |head: &PlayEvent, count: usize| {
        if count >= ALBUM_LOYALTY_MIN_RUN && !head.album_name.is_empty() {
            *runs.entry(head.album_key()).or_default() += 1;
        }
    };

    for event in sorted_by_end_time(events) {
        current = match current {
            Some((head, count)) if !event.album_name.is_empty() && same_album(head, event) => {
                Some((head, count + 1))
            }
            Some((head, count)) => {
                close(head, count);
                Some((event, 1))
            }
            None => Some((event, 1)),
        };
    }
    if let Some((head, count)) = current {
        close(head, count);
    }

    ranked(runs)
}

/// Longest stretch of listening without a real break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListeningStreak {
    /// When the first play of the streak started.
    pub start: Option<NaiveDateTime>,
    /// When the last play of the streak ended.
    pub end: Option<NaiveDateTime>,
    pub duration: Duration,
}

impl Default for ListeningStreak {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            duration: Duration::zero(),
        }
    }
}

/// Find the longest listening streak, tolerating gaps up to `gap_tolerance`
/// between the end of one play and the start of the next.
#[must_use]
pub fn longest_listening_streak(events: &[PlayEvent], gap_tolerance: Duration) -> ListeningStreak {
    let mut longest = Longest::above(Duration::zero());
    let mut streak: Option<(NaiveDateTime, NaiveDateTime)> = None;

    for event in sorted_by_end_time(events) {
        let start = event.start_time();
        streak = match streak {
            Some((from, to)) if start - to <= gap_tolerance => Some((from, event.end_time)),
            Some((from, to)) => {
                longest.offer(to - from, || (from, to));
                Some((start, event.end_time))
            }
            None => Some((start, event.end_time)),
        };
    }
    if let Some((from, to)) = streak {
        longest.offer(to - from, || (from, to));
    }

    longest
        .into_inner()
        .map_or_else(ListeningStreak::default, |(duration, (from, to))| ListeningStreak {
            start: Some(from),
            end: Some(to),
            duration,
        })
}

/// Longest run of plays without a skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnskippableStreak {
    pub plays: usize,
    /// End time of the first play in the run.
    pub start: Option<NaiveDateTime>,
    /// End time of the last play in the run.
    pub end: Option<NaiveDateTime>,
}

#[must_use]
pub fn unskippable_streak(events: &[PlayEvent]) -> UnskippableStreak {
    let mut longest = Longest::above(0);
    let mut run: Option<(NaiveDateTime, NaiveDateTime, usize)> = None;

    for event in sorted_by_end_time(events) {
        if event.is_skipped() {
            if let Some((from, to, plays)) = run.take() {
                longest.offer(plays, || (from, to));
            }
            continue;
        }
        run = Some(match run {
            Some((from, _, plays)) => (from, event.end_time, plays + 1),
            None => (event.end_time, event.end_time, 1),
        });
    }
    if let Some((from, to, plays)) = run {
        longest.offer(plays, || (from, to));
    }

    longest
        .into_inner()
        .map_or_else(UnskippableStreak::default, |(plays, (from, to))| UnskippableStreak {
            plays,
            start: Some(from),
            end: Some(to),
        })
}

/// The longest silence between two plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Silence {
    /// End of the play before the silence.
    pub from: NaiveDateTime,
    /// Start of the play after the silence.
    pub to: NaiveDateTime,
    pub gap: Duration,
}

/// Longest gap between the end of one play and the start of the next.
#[must_use]
pub fn sound_of_silence(events: &[PlayEvent]) -> Option<Silence> {
    let sorted = sorted_by_end_time(events);
    let mut longest = Longest::above(Duration::zero());

    for pair in sorted.windows(2) {
        let from = pair[0].end_time;
        let to = pair[1].start_time();
        longest.offer(to - from, || (from, to));
    }

    longest
        .into_inner()
        .map(|(gap, (from, to))| Silence { from, to, gap })
}

/// Longest run of distinct tracks from one album, played in a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuristRun {
    pub album: AlbumKey,
    /// Distinct track titles heard during the run.
    pub tracks: usize,
}

/// Plays with no album, or whose album is named after the track, are treated
/// as singles and end the current run.
#[must_use]
pub fn album_purist(events: &[PlayEvent]) -> Option<PuristRun> {
    let mut longest = Longest::above(0);
    let mut run: Option<(&PlayEvent, HashSet<&str>)> = None;

    for event in sorted_by_end_time(events) {
        if event.album_name.is_empty() || event.album_name == event.track_name {
            if let Some((head, titles)) = run.take() {
                longest.offer(titles.len(), || head.album_key());
            }
            continue;
        }
        let continues = matches!(&run, Some((head, _)) if same_album(head, event));
        if continues {
            if let Some((_, titles)) = run.as_mut() {
                titles.insert(event.track_name.as_str());
            }
            continue;
        }
        if let Some((head, titles)) = run.take() {
            longest.offer(titles.len(), || head.album_key());
        }
        run = Some((event, HashSet::from([event.track_name.as_str()])));
    }
    if let Some((head, titles)) = run {
        longest.offer(titles.len(), || head.album_key());
    }

    longest
        .into_inner()
        .map(|(tracks, album)| PuristRun { album, tracks })
}

/// Average number of consecutive plays before switching artist.
#[must_use]
pub fn artist_hopper(events: &[PlayEvent]) -> f64 {
    let sorted = sorted_by_end_time(events);
    if sorted.is_empty() {
        return 0.0;
    }
    let switches = sorted
        .windows(2)
        .filter(|pair| pair[0].artist_name != pair[1].artist_name)
        .count();
    sorted.len() as f64 / (switches + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, play, run_of};

    fn ten_minutes() -> Duration {
        Duration::minutes(10)
    }

    #[test]
    fn test_most_consecutive_plays_counts_final_run() {
        let t = at(2024, 1, 1, 9, 0);
        let events = vec![
            play("A", "S").ended(t).build(),
            play("A", "S").ended(t + Duration::minutes(1)).build(),
            play("A", "S").ended(t + Duration::minutes(2)).build(),
        ];
        assert_eq!(most_consecutive_plays(&events), Some((TrackKey::new("A", "S"), 3)));
    }

    #[test]
    fn test_most_consecutive_plays_first_run_wins_tie() {
        let t = at(2024, 1, 1, 9, 0);
        let mut events = run_of("A", "first", t, 2);
        events.extend(run_of("B", "second", t + Duration::hours(1), 2));
        assert_eq!(most_consecutive_plays(&events), Some((TrackKey::new("A", "first"), 2)));
        assert_eq!(most_consecutive_plays(&[]), None);
    }

    #[test]
    fn test_most_consecutive_plays_sorts_by_time() {
        let t = at(2024, 1, 1, 9, 0);
        let events = vec![
            play("A", "S").ended(t).build(),
            play("B", "T").ended(t + Duration::minutes(10)).build(),
            play("A", "S").ended(t + Duration::minutes(1)).build(),
        ];
        assert_eq!(most_consecutive_plays(&events), Some((TrackKey::new("A", "S"), 2)));
    }

    #[test]
    fn test_album_loyalty_includes_final_run() {
        let t = at(2024, 1, 1, 9, 0);
        let mut events: Vec<PlayEvent> = (0..3)
            .map(|i| play("A", &format!("t{i}")).album("LP").ended(t + Duration::minutes(i)).build())
            .collect();
        events.push(play("B", "x").album("Other").ended(t + Duration::minutes(5)).build());
        events.extend((0..4).map(|i| {
            play("A", &format!("t{i}")).album("LP").ended(t + Duration::minutes(10 + i)).build()
        }));
        assert_eq!(album_loyalty(&events), vec![(AlbumKey::new("A", "LP"), 2)]);
    }

    #[test]
    fn test_album_loyalty_ignores_missing_album() {
        let t = at(2024, 1, 1, 9, 0);
        let events = run_of("A", "single", t, 5);
        assert!(album_loyalty(&events).is_empty());
    }

    #[test]
    fn test_longest_listening_streak_empty() {
        let streak = longest_listening_streak(&[], ten_minutes());
        assert_eq!(streak, ListeningStreak::default());
        assert_eq!(streak.duration, Duration::zero());
    }

    #[test]
    fn test_longest_listening_streak_tolerates_small_gaps() {
        let t = at(2024, 1, 1, 9, 0);
        let events = vec![
            // 9:00 - 9:03
            play("A", "1").ended(t + Duration::minutes(3)).build(),
            // starts 9:08, five minutes after the previous end
            play("A", "2").ended(t + Duration::minutes(11)).build(),
            // starts 10:00, far too late
            play("A", "3").ended(t + Duration::minutes(63)).build(),
        ];
        let streak = longest_listening_streak(&events, ten_minutes());
        assert_eq!(streak.start, Some(t));
        assert_eq!(streak.end, Some(t + Duration::minutes(11)));
        assert_eq!(streak.duration, Duration::minutes(11));
    }

    #[test]
    fn test_unskippable_streak() {
        let t = at(2024, 1, 1, 9, 0);
        let mut events = run_of("A", "a", t, 2);
        events.push(play("A", "skip").ended(t + Duration::minutes(7)).skip().build());
        events.extend(run_of("B", "b", t + Duration::minutes(7), 3));

        let streak = unskippable_streak(&events);
        assert_eq!(streak.plays, 3);
        assert_eq!(streak.start, Some(t + Duration::minutes(10)));
        assert_eq!(streak.end, Some(t + Duration::minutes(16)));
        assert_eq!(unskippable_streak(&[]), UnskippableStreak::default());
    }

    #[test]
    fn test_sound_of_silence() {
        let t = at(2024, 1, 1, 9, 0);
        let events = vec![
            play("A", "1").ended(t).build(),
            play("A", "2").ended(t + Duration::days(3)).secs(60).build(),
            play("A", "3").ended(t + Duration::days(3) + Duration::minutes(2)).secs(60).build(),
        ];
        let silence = sound_of_silence(&events).expect("gap");
        assert_eq!(silence.from, t);
        assert_eq!(silence.gap, Duration::days(3) - Duration::minutes(1));
        assert_eq!(silence.gap.num_days(), 2);
        assert!(sound_of_silence(&[]).is_none());
        assert!(sound_of_silence(&events[..1]).is_none());
    }

    #[test]
    fn test_album_purist_counts_unique_titles() {
        let t = at(2024, 1, 1, 9, 0);
        let titles = ["one", "two", "two", "three"];
        let mut events: Vec<PlayEvent> = titles
            .iter()
            .zip(0..)
            .map(|(title, i)| play("A", title).album("LP").ended(t + Duration::minutes(i)).build())
            .collect();
        // A single resets the run.
        events.push(play("B", "Solo").album("Solo").ended(t + Duration::minutes(10)).build());
        events.extend((0..2).map(|i| {
            play("C", &format!("c{i}")).album("EP").ended(t + Duration::minutes(20 + i)).build()
        }));

        let run = album_purist(&events).expect("run");
        assert_eq!(run.album, AlbumKey::new("A", "LP"));
        assert_eq!(run.tracks, 3);
        assert!(album_purist(&[]).is_none());
    }

    #[test]
    fn test_artist_hopper() {
        let t = at(2024, 1, 1, 9, 0);
        let mut events = run_of("A", "a", t, 3);
        events.extend(run_of("B", "b", t + Duration::hours(1), 1));
        assert!((artist_hopper(&events) - 2.0).abs() < f64::EPSILON);
        assert!(artist_hopper(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_streaks_leave_input_untouched() {
        let t = at(2024, 1, 1, 9, 0);
        let events = vec![
            play("B", "b").ended(t + Duration::hours(1)).build(),
            play("A", "a").ended(t).build(),
        ];
        let before = events.clone();
        let first = most_consecutive_plays(&events);
        assert_eq!(most_consecutive_plays(&events), first);
        let _ = longest_listening_streak(&events, ten_minutes());
        assert_eq!(events, before);
    }
}
