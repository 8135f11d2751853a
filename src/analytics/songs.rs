//! Per-track summary used by the CSV export

use chrono::NaiveDateTime;
use indexmap::IndexMap;

use crate::event::PlayEvent;
use crate::types::{Milliseconds, TrackKey};

/// Skipped plays shorter than this are instant skips.
const INSTANT_SKIP: Milliseconds = Milliseconds::from_secs(1);

/// Timestamp format used for first/last played columns.
pub const SONG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Everything known about one track across the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongStats {
    pub artist: String,
    pub track: String,
    pub times_played: u64,
    pub first_played: NaiveDateTime,
    pub last_played: NaiveDateTime,
    pub skipped: u64,
    /// Skips within the first second.
    pub instant_skips: u64,
    /// Plays the listener started by clicking or pressing play.
    pub user_started: u64,
}

impl SongStats {
    fn first_play(event: &PlayEvent) -> Self {
        Self {
            artist: event.artist_name.clone(),
            track: event.track_name.clone(),
            times_played: 0,
            first_played: event.end_time,
            last_played: event.end_time,
            skipped: 0,
            instant_skips: 0,
            user_started: 0,
        }
    }

    fn record(&mut self, event: &PlayEvent) {
        self.times_played += 1;
        self.first_played = self.first_played.min(event.end_time);
        self.last_played = self.last_played.max(event.end_time);
        if event.is_skipped() {
            self.skipped += 1;
            if event.ms_played < INSTANT_SKIP {
                self.instant_skips += 1;
            }
        }
        if event.is_active_start() {
            self.user_started += 1;
        }
    }

    /// `first_played` as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn first_played_label(&self) -> String {
        self.first_played.format(SONG_TIMESTAMP_FORMAT).to_string()
    }

    /// `last_played` as `YYYY-MM-DD HH:MM:SS`.
    #[must_use]
    pub fn last_played_label(&self) -> String {
        self.last_played.format(SONG_TIMESTAMP_FORMAT).to_string()
    }
}

/// One row per distinct track, in the order tracks were first encountered.
#[must_use]
pub fn get_full_song_stats(events: &[PlayEvent]) -> Vec<SongStats> {
    let mut songs: IndexMap<TrackKey, SongStats> = IndexMap::new();
    for event in events {
        songs
            .entry(event.track_key())
            .or_insert_with(|| SongStats::first_play(event))
            .record(event);
    }
    songs.into_values().collect()
}
