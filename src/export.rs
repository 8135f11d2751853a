//! CSV export of per-track statistics

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use crate::analytics::SongStats;
use crate::error::Result;

/// Header row of the song statistics export.
pub const SONG_STATS_HEADER: [&str; 8] = [
    "Artist",
    "Track Name",
    "Times Played",
    "First Played",
    "Last Played",
    "Skipped",
    "Instant Skips",
    "User Started",
];

/// Quote a field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write the header and one row per track.
pub fn write_song_stats<W: Write>(out: &mut W, songs: &[SongStats]) -> Result<()> {
    writeln!(out, "{}", SONG_STATS_HEADER.join(","))?;
    for song in songs {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            csv_field(&song.artist),
            csv_field(&song.track),
            song.times_played,
            song.first_played_label(),
            song.last_played_label(),
            song.skipped,
            song.instant_skips,
            song.user_started
        )?;
    }
    Ok(())
}

/// Write the export to `path`, replacing any existing file.
pub fn export_song_stats(path: &Path, songs: &[SongStats]) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    write_song_stats(&mut out, songs)?;
    out.flush()?;
    info!("Exported {} tracks to {}", songs.len(), path.display());
    Ok(())
}
