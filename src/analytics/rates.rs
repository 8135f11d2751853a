//! Ratio and rate aggregations
//!
//! Per-group ratios only consider groups that meet the stated minimum
//! number of plays. Whole-history ratios fall back to zero on empty input.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, NaiveDate, Timelike};
use indexmap::IndexMap;

use super::{
    ascending, descending, percentage, play_counts_by_artist, ranked, PlaySkips, Ranking,
};
use crate::event::{PlayEvent, ACTIVE_START_REASONS, REASON_APPLOAD, REASON_REMOTE};
use crate::types::{AlbumKey, Milliseconds, TrackKey};

/// Tracks need more plays than this for an obsession score.
const OBSESSION_MIN_PLAYS: u64 = 10;
/// Tracks need more plays than this to show up in skipper's remorse.
const REMORSE_MIN_PLAYS: u64 = 20;
/// Skip rate, in percent, a track must exceed for skipper's remorse.
const REMORSE_MIN_RATE: f64 = 50.0;
/// How many artists make up the comfort zone.
const COMFORT_ZONE_SIZE: usize = 10;
/// How many artists are listed as most respected.
const RESPECTED_ARTISTS: usize = 10;

/// Start reasons counted as a deliberate choice in artist traits.
const CHOICE_START_REASONS: [&str; 4] = [
    ACTIVE_START_REASONS[0],
    ACTIVE_START_REASONS[1],
    REASON_APPLOAD,
    REASON_REMOTE,
];

/// Skipped versus completed plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipRatio {
    pub skipped: u64,
    pub not_skipped: u64,
}

#[must_use]
pub fn skipped_ratio(events: &[PlayEvent]) -> SkipRatio {
    events.iter().fold(SkipRatio::default(), |mut ratio, event| {
        if event.is_skipped() {
            ratio.skipped += 1;
        } else {
            ratio.not_skipped += 1;
        }
        ratio
    })
}

/// Skip percentage per artist, for artists with more than `min_plays` plays.
#[must_use]
pub fn true_skip_rate(events: &[PlayEvent], min_plays: u64) -> Ranking<String, f64> {
    let mut tally: IndexMap<String, PlaySkips> = IndexMap::new();
    for event in events {
        tally.entry(event.artist_name.clone()).or_default().record(event.is_skipped());
    }
    descending(
        tally
            .into_iter()
            .filter(|(_, stats)| stats.plays > min_plays)
            .map(|(artist, stats)| (artist, stats.skip_rate()))
            .collect(),
    )
}

/// Tracks played more than 20 times and skipped more than half of them.
#[must_use]
pub fn skippers_remorse(events: &[PlayEvent]) -> Ranking<TrackKey, f64> {
    let mut tally: IndexMap<TrackKey, PlaySkips> = IndexMap::new();
    for event in events {
        tally.entry(event.track_key()).or_default().record(event.is_skipped());
    }
    descending(
        tally
            .into_iter()
            .filter(|(_, stats)| stats.plays > REMORSE_MIN_PLAYS)
            .map(|(track, stats)| (track, stats.skip_rate()))
            .filter(|(_, rate)| *rate > REMORSE_MIN_RATE)
            .collect(),
    )
}

/// Albums with at least `min_plays` plays, lowest skip rate first.
/// Plays without an album name are ignored.
#[must_use]
pub fn skipless_albums(events: &[PlayEvent], min_plays: u64) -> Ranking<AlbumKey, f64> {
    let mut tally: IndexMap<AlbumKey, PlaySkips> = IndexMap::new();
    for event in events.iter().filter(|e| !e.album_name.is_empty()) {
        tally.entry(event.album_key()).or_default().record(event.is_skipped());
    }
    ascending(
        tally
            .into_iter()
            .filter(|(_, stats)| stats.plays >= min_plays)
            .map(|(album, stats)| (album, stats.skip_rate()))
            .collect(),
    )
}

/// Unique artists divided by plays, per calendar year.
#[must_use]
pub fn variety_score(events: &[PlayEvent]) -> BTreeMap<i32, f64> {
    let mut years: BTreeMap<i32, (u64, HashSet<&str>)> = BTreeMap::new();
    for event in events {
        let (plays, artists) = years.entry(event.end_time.year()).or_default();
        *plays += 1;
        artists.insert(event.artist_name.as_str());
    }
    years
        .into_iter()
        .map(|(year, (plays, artists))| (year, artists.len() as f64 / plays as f64))
        .collect()
}

/// Plays divided by distinct days played, for tracks with more than ten plays.
#[must_use]
pub fn obsession_score(events: &[PlayEvent]) -> Ranking<TrackKey, f64> {
    let mut tally: IndexMap<TrackKey, (u64, HashSet<NaiveDate>)> = IndexMap::new();
    for event in events {
        let (plays, days) = tally.entry(event.track_key()).or_default();
        *plays += 1;
        days.insert(event.end_time.date());
    }
    descending(
        tally
            .into_iter()
            .filter(|(_, (plays, _))| *plays > OBSESSION_MIN_PLAYS)
            .map(|(track, (plays, days))| (track, plays as f64 / days.len() as f64))
            .collect(),
    )
}

/// Unique tracks divided by plays, for artists with at least `min_plays` plays.
///
/// Values near 1 mean the artist's catalogue was sampled widely; values
/// near 0 mean a few tracks were replayed.
#[must_use]
pub fn sampler_vs_completionist(events: &[PlayEvent], min_plays: u64) -> Ranking<String, f64> {
    let mut tally: IndexMap<String, (u64, HashSet<&str>)> = IndexMap::new();
    for event in events {
        let (plays, tracks) = tally.entry(event.artist_name.clone()).or_default();
        *plays += 1;
        tracks.insert(event.track_name.as_str());
    }
    descending(
        tally
            .into_iter()
            .filter(|(_, (plays, _))| *plays >= min_plays)
            .map(|(artist, (plays, tracks))| (artist, tracks.len() as f64 / plays as f64))
            .collect(),
    )
}

/// Skip rates with shuffle on and off, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShuffleParadox {
    pub shuffle_skip_rate: f64,
    pub normal_skip_rate: f64,
}

/// Compare skip rates with and without shuffle. A missing flag counts as off.
#[must_use]
pub fn shuffle_paradox(events: &[PlayEvent]) -> ShuffleParadox {
    let mut shuffled = PlaySkips::default();
    let mut normal = PlaySkips::default();
    for event in events {
        let bucket = if event.is_shuffled() {
            &mut shuffled
        } else {
            &mut normal
        };
        bucket.record(event.is_skipped());
    }
    ShuffleParadox {
        shuffle_skip_rate: shuffled.skip_rate(),
        normal_skip_rate: normal.skip_rate(),
    }
}

/// How plays ended, and which artists are most often heard to the end.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NaturalDeath {
    /// Percentage of plays that ended on their own.
    pub natural: f64,
    /// Percentage of plays the listener cut short.
    pub killed: f64,
    /// Up to ten artists with the highest finish rate.
    pub most_respected: Ranking<String, f64>,
}

#[must_use]
pub fn natural_death(events: &[PlayEvent], min_plays: u64) -> NaturalDeath {
    if events.is_empty() {
        return NaturalDeath::default();
    }

    let mut finished = 0;
    let mut artists: IndexMap<String, (u64, u64)> = IndexMap::new();
    for event in events {
        let (done, total) = artists.entry(event.artist_name.clone()).or_default();
        *total += 1;
        if event.ended_naturally() {
            *done += 1;
            finished += 1;
        }
    }

    let natural = percentage(finished, events.len() as u64);
    let mut most_respected = descending(
        artists
            .into_iter()
            .filter(|(_, (_, total))| *total >= min_plays)
            .map(|(artist, (done, total))| (artist, percentage(done, total)))
            .collect(),
    );
    most_respected.truncate(RESPECTED_ARTISTS);

    NaturalDeath {
        natural,
        killed: 100.0 - natural,
        most_respected,
    }
}

/// Share of plays the listener started deliberately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlFreak {
    pub active: f64,
    pub passive: f64,
    /// Artist with the most deliberate starts.
    pub most_clicked: Option<(String, u64)>,
}

#[must_use]
pub fn control_freak(events: &[PlayEvent]) -> ControlFreak {
    if events.is_empty() {
        return ControlFreak::default();
    }

    let mut clicks: IndexMap<String, u64> = IndexMap::new();
    for event in events.iter().filter(|e| e.is_active_start()) {
        *clicks.entry(event.artist_name.clone()).or_default() += 1;
    }
    let active_count: u64 = clicks.iter().map(|(_, count)| count).sum();
    let active = percentage(active_count, events.len() as u64);

    ControlFreak {
        active,
        passive: 100.0 - active,
        most_clicked: ranked(clicks).into_iter().next(),
    }
}

/// Percentage of deliberate starts per calendar year.
#[must_use]
pub fn active_listening_trend(events: &[PlayEvent]) -> BTreeMap<i32, f64> {
    let mut years: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for event in events {
        let (active, total) = years.entry(event.end_time.year()).or_default();
        *total += 1;
        if event.is_active_start() {
            *active += 1;
        }
    }
    years
        .into_iter()
        .map(|(year, (active, total))| (year, percentage(active, total)))
        .collect()
}

/// Share of listening time spent on the most listened artists.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComfortZone {
    /// Percentage of total listening time.
    pub share: f64,
    pub artists: Ranking<String, Milliseconds>,
}

#[must_use]
pub fn comfort_zone(events: &[PlayEvent]) -> ComfortZone {
    let total: Milliseconds = events.iter().map(|e| e.ms_played).sum();
    if total.is_zero() {
        return ComfortZone::default();
    }

    let mut artists = super::longest_played_artist(events);
    artists.truncate(COMFORT_ZONE_SIZE);
    let top: Milliseconds = artists.iter().map(|(_, time)| *time).sum();

    ComfortZone {
        share: top.get() as f64 / total.get() as f64 * 100.0,
        artists,
    }
}

/// Listening personality of one artist, every trait in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistTraits {
    pub artist: String,
    /// One minus the skip rate.
    pub loyalty: f64,
    /// Unique tracks per play.
    pub discovery: f64,
    /// Share of plays between 6 PM and 6 AM.
    pub night_owl: f64,
    /// Share of plays on Saturday or Sunday.
    pub weekend_warrior: f64,
    /// Share of plays started by the listener or a device.
    pub active_choice: f64,
}

#[derive(Default)]
struct TraitCounts<'a> {
    plays: u64,
    skips: u64,
    tracks: HashSet<&'a str>,
    night: u64,
    weekend: u64,
    chosen: u64,
}

/// Traits for the `top_n` most played artists, in ranking order.
#[must_use]
pub fn artist_traits(events: &[PlayEvent], top_n: usize) -> Vec<ArtistTraits> {
    let top: Vec<String> = play_counts_by_artist(events)
        .into_iter()
        .take(top_n)
        .map(|(artist, _)| artist)
        .collect();

    let mut counts: IndexMap<&str, TraitCounts<'_>> = top
        .iter()
        .map(|artist| (artist.as_str(), TraitCounts::default()))
        .collect();

    for event in events {
        let Some(c) = counts.get_mut(event.artist_name.as_str()) else {
            continue;
        };
        let hour = event.end_time.hour();
        c.plays += 1;
        c.skips += u64::from(event.is_skipped());
        c.tracks.insert(event.track_name.as_str());
        c.night += u64::from(!(6..18).contains(&hour));
        c.weekend += u64::from(event.end_time.weekday().num_days_from_monday() >= 5);
        c.chosen += u64::from(CHOICE_START_REASONS.contains(&event.reason_start.as_str()));
    }

    counts
        .into_iter()
        .filter(|(_, c)| c.plays > 0)
        .map(|(artist, c)| {
            let plays = c.plays as f64;
            ArtistTraits {
                artist: artist.to_string(),
                loyalty: 1.0 - c.skips as f64 / plays,
                discovery: c.tracks.len() as f64 / plays,
                night_owl: c.night as f64 / plays,
                weekend_warrior: c.weekend as f64 / plays,
                active_choice: c.chosen as f64 / plays,
            }
        })
        .collect()
}
