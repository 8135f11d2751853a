//! Play events - the canonical record every aggregation consumes

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::types::{AlbumKey, Milliseconds, TrackKey};

/// Playback started because the user clicked a row.
pub const REASON_CLICKROW: &str = "clickrow";
/// Playback started from the play button.
pub const REASON_PLAYBTN: &str = "playbtn";
/// Playback started when the app was opened.
pub const REASON_APPLOAD: &str = "appload";
/// Playback started from a remote device.
pub const REASON_REMOTE: &str = "remote";
/// The track played to its natural end.
pub const REASON_TRACKDONE: &str = "trackdone";

/// Start reasons that count as an explicit user action.
pub const ACTIVE_START_REASONS: [&str; 2] = [REASON_CLICKROW, REASON_PLAYBTN];

/// Plays shorter than this are treated as skips when the export has no skip flag.
const SKIP_FALLBACK_THRESHOLD: Milliseconds = Milliseconds::from_secs(30);

/// One historical play.
///
/// `end_time` is the wall-clock moment playback stopped. Reason codes and
/// platform identifiers are open sets and kept as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub end_time: NaiveDateTime,
    pub artist_name: String,
    pub album_name: String,
    pub track_name: String,
    pub ms_played: Milliseconds,
    pub platform: String,
    pub country: String,
    pub reason_start: String,
    pub reason_end: String,
    pub shuffle: Option<bool>,
    pub skipped: Option<bool>,
}

impl PlayEvent {
    /// How long this play lasted.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.ms_played.to_duration()
    }

    /// When playback began, inferred from the end time and the play duration.
    #[must_use]
    pub fn start_time(&self) -> NaiveDateTime {
        self.end_time - self.elapsed()
    }

    /// Whether this play was skipped.
    ///
    /// Uses the exported flag when present. Otherwise a play counts as
    /// skipped if it lasted under 30 seconds and did not end naturally.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped.unwrap_or_else(|| {
            self.ms_played < SKIP_FALLBACK_THRESHOLD && self.reason_end != REASON_TRACKDONE
        })
    }

    /// Whether the user explicitly started this play.
    #[must_use]
    pub fn is_active_start(&self) -> bool {
        ACTIVE_START_REASONS.contains(&self.reason_start.as_str())
    }

    /// Whether the track played to its natural end.
    #[must_use]
    pub fn ended_naturally(&self) -> bool {
        self.reason_end == REASON_TRACKDONE
    }

    /// Whether shuffle was on. A missing flag counts as off.
    #[must_use]
    pub fn is_shuffled(&self) -> bool {
        self.shuffle.unwrap_or(false)
    }

    #[must_use]
    pub fn track_key(&self) -> TrackKey {
        TrackKey::new(&self.artist_name, &self.track_name)
    }

    #[must_use]
    pub fn album_key(&self) -> AlbumKey {
        AlbumKey::new(&self.artist_name, &self.album_name)
    }
}

/// Copy of `events` ordered by `end_time`.
///
/// The sort is stable, so events sharing an end time keep their input order.
/// The caller's slice is never reordered.
#[must_use]
pub fn sorted_by_end_time(events: &[PlayEvent]) -> Vec<&PlayEvent> {
    let mut sorted: Vec<&PlayEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.end_time);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, play};

    #[test]
    fn test_elapsed_and_start_time() {
        let event = play("A", "Song").ended(at(2024, 1, 1, 12, 5)).secs(180).build();
        assert_eq!(event.elapsed(), Duration::seconds(180));
        assert_eq!(event.start_time(), at(2024, 1, 1, 12, 2));
    }

    #[test]
    fn test_explicit_skip_flag_wins() {
        let skipped = play("A", "Song").secs(300).skipped(Some(true)).build();
        assert!(skipped.is_skipped());

        let kept = play("A", "Song").secs(5).reason_end("fwdbtn").skipped(Some(false)).build();
        assert!(!kept.is_skipped());
    }

    #[test]
    fn test_skip_fallback_short_and_interrupted() {
        let event = play("A", "Song").secs(10).reason_end("fwdbtn").skipped(None).build();
        assert!(event.is_skipped());
    }

    #[test]
    fn test_skip_fallback_short_but_finished() {
        let event = play("A", "Song").secs(10).reason_end("trackdone").skipped(None).build();
        assert!(!event.is_skipped());
    }

    #[test]
    fn test_skip_fallback_long_play_never_skipped() {
        for reason in ["fwdbtn", "trackdone", "endplay", "unknown"] {
            let event = play("A", "Song").secs(40).reason_end(reason).skipped(None).build();
            assert!(!event.is_skipped(), "reason_end {reason} should not be a skip");
        }
    }

    #[test]
    fn test_active_start() {
        assert!(play("A", "S").reason_start("clickrow").build().is_active_start());
        assert!(play("A", "S").reason_start("playbtn").build().is_active_start());
        assert!(!play("A", "S").reason_start("trackdone").build().is_active_start());
        assert!(!play("A", "S").reason_start("something-new").build().is_active_start());
    }

    #[test]
    fn test_keys_carry_artist() {
        let event = play("Muse", "Uprising").album("The Resistance").build();
        assert_eq!(event.track_key(), TrackKey::new("Muse", "Uprising"));
        assert_eq!(event.album_key(), AlbumKey::new("Muse", "The Resistance"));
    }

    #[test]
    fn test_sorted_by_end_time_is_stable_and_non_mutating() {
        let t = at(2024, 3, 1, 10, 0);
        let events = vec![
            play("B", "later").ended(t + Duration::minutes(5)).build(),
            play("A", "first-tie").ended(t).build(),
            play("C", "second-tie").ended(t).build(),
        ];
        let before = events.clone();

        let sorted = sorted_by_end_time(&events);
        let names: Vec<&str> = sorted.iter().map(|e| e.track_name.as_str()).collect();
        assert_eq!(names, ["first-tie", "second-tie", "later"]);
        assert_eq!(events, before);
    }
}
