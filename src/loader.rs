//! Streaming-history export loader
//!
//! Reads the `Streaming_History*.json` files of an extended streaming-history
//! export (already extracted to a directory) into [`PlayEvent`]s.
//!
//! Each file holds a JSON array of records. Only music plays are kept:
//! records without a track title, and podcast or audiobook records, are
//! dropped. Records whose timestamp cannot be parsed, or whose play duration
//! is negative or reaches back past the earliest representable date, are
//! dropped with a warning rather than failing the whole load.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDateTime};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::event::PlayEvent;
use crate::types::Milliseconds;

/// File name prefix of the play history files inside an export.
pub const HISTORY_FILE_PREFIX: &str = "Streaming_History";

/// Timestamp format of the `ts` field. The trailing `Z` is ignored and the
/// time is used as wall-clock time.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// One record as it appears in the export.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRecord {
    ts: Option<String>,
    ms_played: Option<i64>,
    master_metadata_track_name: Option<String>,
    master_metadata_album_artist_name: Option<String>,
    master_metadata_album_album_name: Option<String>,
    platform: Option<String>,
    conn_country: Option<String>,
    reason_start: Option<String>,
    reason_end: Option<String>,
    shuffle: Option<bool>,
    skipped: Option<bool>,
    episode_name: Option<String>,
    audiobook_title: Option<String>,
}

fn present(field: Option<&String>) -> bool {
    field.is_some_and(|value| !value.is_empty())
}

impl RawRecord {
    fn is_music(&self) -> bool {
        present(self.master_metadata_track_name.as_ref())
            && !present(self.episode_name.as_ref())
            && !present(self.audiobook_title.as_ref())
    }

    /// `Ok(None)` for records that are not music plays.
    fn into_event(self) -> Result<Option<PlayEvent>> {
        if !self.is_music() {
            return Ok(None);
        }

        let ts = self
            .ts
            .ok_or_else(|| Error::invalid_event("record has no timestamp"))?;
        let end_time = NaiveDateTime::parse_from_str(&ts, EXPORT_TIMESTAMP_FORMAT)
            .map_err(|e| Error::invalid_event(format!("bad timestamp '{ts}': {e}")))?;

        let ms_played = self.ms_played.unwrap_or_default();
        if ms_played < 0 {
            return Err(Error::invalid_event(format!(
                "negative ms_played {ms_played} at '{ts}'"
            )));
        }
        Duration::try_milliseconds(ms_played)
            .and_then(|elapsed| end_time.checked_sub_signed(elapsed))
            .ok_or_else(|| {
                Error::invalid_event(format!("ms_played {ms_played} out of range at '{ts}'"))
            })?;

        Ok(Some(PlayEvent {
            end_time,
            artist_name: self.master_metadata_album_artist_name.unwrap_or_default(),
            album_name: self.master_metadata_album_album_name.unwrap_or_default(),
            track_name: self.master_metadata_track_name.unwrap_or_default(),
            ms_played: Milliseconds::new(ms_played),
            platform: self.platform.unwrap_or_default(),
            country: self.conn_country.unwrap_or_default(),
            reason_start: self.reason_start.unwrap_or_default(),
            reason_end: self.reason_end.unwrap_or_default(),
            shuffle: self.shuffle,
            skipped: self.skipped,
        }))
    }
}

/// History files in `dir`, sorted by file name.
pub fn history_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(HISTORY_FILE_PREFIX) && name.ends_with(".json") {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Parse one history file's JSON array, keeping music plays in file order.
pub fn read_history<R: Read>(reader: R) -> Result<Vec<PlayEvent>> {
    let records: Vec<RawRecord> = serde_json::from_reader(reader)?;
    let total = records.len();

    let mut events = Vec::with_capacity(total);
    for record in records {
        match record.into_event() {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(e) => warn!("Skipping record: {}", e),
        }
    }

    if events.len() < total {
        debug!("Dropped {} of {} records", total - events.len(), total);
    }
    Ok(events)
}

/// Load every play in the export directory `dir`.
///
/// Files are read in name order and their plays concatenated.
pub fn load_history(dir: &Path) -> Result<Vec<PlayEvent>> {
    let files = history_files(dir)?;
    if files.is_empty() {
        return Err(Error::NoHistory(dir.display().to_string()));
    }

    let mut events = Vec::new();
    for path in &files {
        let file = File::open(path)?;
        let plays = read_history(BufReader::new(file))?;
        debug!("Loaded {} plays from {}", plays.len(), path.display());
        events.extend(plays);
    }

    info!(
        "Loaded {} plays from {} history files",
        events.len(),
        files.len()
    );
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::at;

    const SAMPLE: &str = r#"[
        {
            "ts": "2024-03-01T09:15:00Z",
            "platform": "android",
            "ms_played": 215000,
            "conn_country": "DE",
            "master_metadata_track_name": "Song",
            "master_metadata_album_artist_name": "Artist",
            "master_metadata_album_album_name": "Album",
            "reason_start": "clickrow",
            "reason_end": "trackdone",
            "shuffle": false,
            "skipped": null,
            "offline": false,
            "episode_name": null,
            "audiobook_title": null
        },
        {
            "ts": "2024-03-01T10:00:00Z",
            "ms_played": 60000,
            "master_metadata_track_name": null,
            "episode_name": "Episode 12"
        },
        {
            "ts": "2024-03-01T11:00:00Z",
            "ms_played": 5000,
            "master_metadata_track_name": "Chapter 1",
            "audiobook_title": "A Book"
        },
        {
            "ts": "yesterday",
            "ms_played": 1000,
            "master_metadata_track_name": "Broken"
        },
        {
            "ts": "2024-03-02T08:00:00Z",
            "ms_played": 1200,
            "master_metadata_track_name": "Orphan",
            "master_metadata_album_artist_name": null,
            "skipped": true
        }
    ]"#;

    #[test]
    fn test_read_history_keeps_music_only() {
        let events = read_history(SAMPLE.as_bytes()).expect("parse");
        assert_eq!(events.len(), 2);

        let first = &events[0];
        assert_eq!(first.end_time, at(2024, 3, 1, 9, 15));
        assert_eq!(first.artist_name, "Artist");
        assert_eq!(first.album_name, "Album");
        assert_eq!(first.track_name, "Song");
        assert_eq!(first.ms_played, Milliseconds::new(215_000));
        assert_eq!(first.platform, "android");
        assert_eq!(first.country, "DE");
        assert_eq!(first.reason_start, "clickrow");
        assert_eq!(first.shuffle, Some(false));
        assert_eq!(first.skipped, None);

        let orphan = &events[1];
        assert_eq!(orphan.artist_name, "");
        assert_eq!(orphan.album_name, "");
        assert_eq!(orphan.skipped, Some(true));
    }

    #[test]
    fn test_read_history_drops_negative_duration() {
        let json = r#"[
            {"ts": "2024-03-01T09:15:00Z", "ms_played": -60000, "master_metadata_track_name": "Backwards"},
            {"ts": "2024-03-01T09:20:00Z", "ms_played": 60000, "master_metadata_track_name": "Fine"}
        ]"#;
        let events = read_history(json.as_bytes()).expect("parse");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].track_name, "Fine");
    }

    #[test]
    fn test_read_history_drops_out_of_range_duration() {
        let json = r#"[
            {"ts": "2024-03-01T09:15:00Z", "ms_played": 9223372036854775807, "master_metadata_track_name": "Forever"},
            {"ts": "2024-03-01T09:20:00Z", "ms_played": 60000, "master_metadata_track_name": "Fine"}
        ]"#;
        let events = read_history(json.as_bytes()).expect("parse");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].track_name, "Fine");

        // Every kept play has a usable start time.
        let streak = crate::analytics::longest_listening_streak(&events, Duration::minutes(10));
        assert_eq!(streak.start, Some(at(2024, 3, 1, 9, 19)));
    }

    #[test]
    fn test_read_history_rejects_non_array() {
        assert!(read_history("{}".as_bytes()).is_err());
    }

    #[test]
    fn test_load_history_reads_files_in_name_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let later = r#"[{"ts": "2023-01-01T00:00:00Z", "ms_played": 1, "master_metadata_track_name": "later-file"}]"#;
        let earlier = r#"[{"ts": "2024-01-01T00:00:00Z", "ms_played": 1, "master_metadata_track_name": "earlier-file"}]"#;
        std::fs::write(dir.path().join("Streaming_History_Audio_2024_1.json"), later)
            .expect("write");
        std::fs::write(dir.path().join("Streaming_History_Audio_2023_0.json"), earlier)
            .expect("write");
        std::fs::write(dir.path().join("Playlist1.json"), "not json").expect("write");

        let events = load_history(dir.path()).expect("load");
        let names: Vec<&str> = events.iter().map(|e| e.track_name.as_str()).collect();
        assert_eq!(names, ["earlier-file", "later-file"]);
    }

    #[test]
    fn test_load_history_without_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_history(dir.path()).expect_err("no history");
        assert!(matches!(err, Error::NoHistory(_)));
    }

    #[test]
    fn test_load_history_missing_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_history(&dir.path().join("missing")).expect_err("missing dir");
        assert!(matches!(err, Error::Io(_)));
    }
}
