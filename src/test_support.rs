//! Builders shared by the unit tests.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::event::PlayEvent;
use crate::types::Milliseconds;

/// Wall-clock timestamp at minute resolution.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid test timestamp")
}

/// Start building a finished, unskipped three-minute play.
pub fn play(artist: &str, track: &str) -> PlayBuilder {
    PlayBuilder(PlayEvent {
        end_time: at(2024, 1, 1, 12, 0),
        artist_name: artist.to_string(),
        album_name: String::new(),
        track_name: track.to_string(),
        ms_played: Milliseconds::from_secs(180),
        platform: "android".to_string(),
        country: "US".to_string(),
        reason_start: "trackdone".to_string(),
        reason_end: "trackdone".to_string(),
        shuffle: Some(false),
        skipped: Some(false),
    })
}

/// `count` back-to-back three-minute plays of one track, starting at `start`.
pub fn run_of(artist: &str, track: &str, start: NaiveDateTime, count: usize) -> Vec<PlayEvent> {
    (0..count)
        .map(|i| {
            let offset = Duration::minutes(3 * (i as i64 + 1));
            play(artist, track).ended(start + offset).build()
        })
        .collect()
}

pub struct PlayBuilder(PlayEvent);

impl PlayBuilder {
    pub fn ended(mut self, end_time: NaiveDateTime) -> Self {
        self.0.end_time = end_time;
        self
    }

    pub fn album(mut self, album: &str) -> Self {
        self.0.album_name = album.to_string();
        self
    }

    pub fn secs(mut self, secs: i64) -> Self {
        self.0.ms_played = Milliseconds::from_secs(secs);
        self
    }

    pub fn ms(mut self, ms: i64) -> Self {
        self.0.ms_played = Milliseconds::new(ms);
        self
    }

    pub fn platform(mut self, platform: &str) -> Self {
        self.0.platform = platform.to_string();
        self
    }

    pub fn country(mut self, country: &str) -> Self {
        self.0.country = country.to_string();
        self
    }

    pub fn reason_start(mut self, reason: &str) -> Self {
        self.0.reason_start = reason.to_string();
        self
    }

    pub fn reason_end(mut self, reason: &str) -> Self {
        self.0.reason_end = reason.to_string();
        self
    }

    pub fn shuffle(mut self, shuffle: Option<bool>) -> Self {
        self.0.shuffle = shuffle;
        self
    }

    pub fn skipped(mut self, skipped: Option<bool>) -> Self {
        self.0.skipped = skipped;
        self
    }

    pub fn skip(self) -> Self {
        self.skipped(Some(true))
    }

    pub fn build(self) -> PlayEvent {
        self.0
    }
}
