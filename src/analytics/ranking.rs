//! Ranking and counting aggregations
//!
//! Each function groups plays by a key, optionally filtered by a predicate
//! over the play, and returns the groups ordered by their measure.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use indexmap::IndexMap;

use super::{best, count_by, descending, ranked, Ranking};
use crate::event::{PlayEvent, REASON_CLICKROW};
use crate::types::{AlbumKey, Milliseconds, TrackKey};

/// Skipped plays shorter than this count as immediate skips.
const IMMEDIATE_SKIP: Milliseconds = Milliseconds::from_secs(30);
/// Skipped plays shorter than this count as instant skips.
const INSTANT_SKIP: Milliseconds = Milliseconds::from_secs(1);

const MARATHON_MIN: Milliseconds = Milliseconds::from_mins(5);
const SHORT_TRACK_MAX: Milliseconds = Milliseconds::from_secs(120);
const EPIC_TRACK_MIN: Milliseconds = Milliseconds::from_secs(420);

/// Minimum plays before an artist can be called clockwork.
const CLOCKWORK_MIN_PLAYS: u64 = 50;
/// Share of an artist's plays that must fall in one window.
const CLOCKWORK_SHARE: f64 = 0.7;
/// Width of a clockwork time window in hours.
const CLOCKWORK_WINDOW_HOURS: u32 = 4;

fn artist(event: &PlayEvent) -> String {
    event.artist_name.clone()
}

fn hour(event: &PlayEvent) -> u32 {
    event.end_time.hour()
}

fn weekday(event: &PlayEvent) -> Weekday {
    event.end_time.weekday()
}

fn is_workday(day: Weekday) -> bool {
    day.num_days_from_monday() < 5
}

/// Count artists among plays matching `include`.
fn artists_where(events: &[PlayEvent], include: impl Fn(&PlayEvent) -> bool) -> Ranking<String> {
    count_by(events, include, artist)
}

/// Count tracks among plays matching `include`.
fn tracks_where(events: &[PlayEvent], include: impl Fn(&PlayEvent) -> bool) -> Ranking<TrackKey> {
    count_by(events, include, PlayEvent::track_key)
}

fn total_time_by<K: Eq + Hash>(
    events: &[PlayEvent],
    key: impl Fn(&PlayEvent) -> K,
) -> Ranking<K, Milliseconds> {
    let mut totals: IndexMap<K, Milliseconds> = IndexMap::new();
    for event in events {
        *totals.entry(key(event)).or_default() += event.ms_played;
    }
    ranked(totals)
}

// ============================================================================
// Plain counts
// ============================================================================

/// Plays per track.
#[must_use]
pub fn play_counts(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |_| true)
}

/// Plays per artist.
#[must_use]
pub fn play_counts_by_artist(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, |_| true)
}

/// Plays per album. Albums are keyed by artist and title.
#[must_use]
pub fn play_counts_by_album(events: &[PlayEvent]) -> Ranking<AlbumKey> {
    count_by(events, |_| true, PlayEvent::album_key)
}

/// Plays per playback platform.
#[must_use]
pub fn platform_usage(events: &[PlayEvent]) -> Ranking<String> {
    count_by(events, |_| true, |e| e.platform.clone())
}

/// Plays per connection country.
#[must_use]
pub fn location_counts(events: &[PlayEvent]) -> Ranking<String> {
    count_by(events, |_| true, |e| e.country.clone())
}

// ============================================================================
// Skips
// ============================================================================

#[must_use]
pub fn most_skipped_artist(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, PlayEvent::is_skipped)
}

#[must_use]
pub fn most_skipped_track(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, PlayEvent::is_skipped)
}

/// Tracks skipped within the first 30 seconds.
#[must_use]
pub fn immediate_skips(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| e.is_skipped() && e.ms_played < IMMEDIATE_SKIP)
}

/// Tracks skipped within the first second.
#[must_use]
pub fn instant_skips(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| e.is_skipped() && e.ms_played < INSTANT_SKIP)
}

// ============================================================================
// Listening time
// ============================================================================

/// Total listening time per artist.
#[must_use]
pub fn longest_played_artist(events: &[PlayEvent]) -> Ranking<String, Milliseconds> {
    total_time_by(events, artist)
}

/// Total listening time per track.
#[must_use]
pub fn longest_played_tracks(events: &[PlayEvent]) -> Ranking<TrackKey, Milliseconds> {
    total_time_by(events, PlayEvent::track_key)
}

/// The calendar date with the most listening time.
#[must_use]
pub fn most_musical_day(events: &[PlayEvent]) -> Option<(NaiveDate, Milliseconds)> {
    let mut days: IndexMap<NaiveDate, Milliseconds> = IndexMap::new();
    for event in events {
        *days.entry(event.end_time.date()).or_default() += event.ms_played;
    }
    best(days.iter()).map(|(&date, &time)| (date, time))
}

/// Most time spent on a single artist within one calendar day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    pub artist: String,
    pub date: NaiveDate,
    pub listened: Milliseconds,
}

#[must_use]
pub fn single_day_record(events: &[PlayEvent]) -> Option<DayRecord> {
    let mut days: IndexMap<(NaiveDate, &str), Milliseconds> = IndexMap::new();
    for event in events {
        *days
            .entry((event.end_time.date(), event.artist_name.as_str()))
            .or_default() += event.ms_played;
    }
    best(days.iter()).map(|((date, artist), &listened)| DayRecord {
        artist: (*artist).to_string(),
        date: *date,
        listened,
    })
}

/// Time between the first and last play of each artist, for artists whose
/// history spans more than a day. Longest first.
#[must_use]
pub fn longest_artist_relationship(events: &[PlayEvent]) -> Ranking<String, chrono::Duration> {
    let mut bounds: IndexMap<String, Option<(NaiveDateTime, NaiveDateTime)>> = IndexMap::new();
    for event in events {
        let slot = bounds.entry(event.artist_name.clone()).or_default();
        *slot = Some(match *slot {
            Some((first, last)) => (first.min(event.end_time), last.max(event.end_time)),
            None => (event.end_time, event.end_time),
        });
    }

    let spans = bounds
        .into_iter()
        .filter_map(|(artist, span)| span.map(|(first, last)| (artist, last - first)))
        .filter(|(_, span)| *span > chrono::Duration::days(1))
        .collect();
    descending(spans)
}

// ============================================================================
// Track filters
// ============================================================================

/// Tracks most often played for longer than five minutes.
#[must_use]
pub fn marathon_tracks(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| e.ms_played > MARATHON_MIN)
}

/// Tracks finished in under two minutes.
#[must_use]
pub fn short_king(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| e.ms_played < SHORT_TRACK_MAX && e.ended_naturally())
}

/// Tracks finished after more than seven minutes.
#[must_use]
pub fn epic_saga(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| e.ms_played > EPIC_TRACK_MIN && e.ended_naturally())
}

/// Tracks started by clicking them.
#[must_use]
pub fn manual_laborer(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| e.reason_start == REASON_CLICKROW)
}

/// Tracks played with shuffle explicitly on.
#[must_use]
pub fn shuffle_roulette(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| e.shuffle == Some(true))
}

/// Tracks ranked by the number of distinct days they were played on.
#[must_use]
pub fn consistency_king(events: &[PlayEvent]) -> Ranking<TrackKey> {
    let mut days: IndexMap<TrackKey, HashSet<NaiveDate>> = IndexMap::new();
    for event in events {
        days.entry(event.track_key())
            .or_default()
            .insert(event.end_time.date());
    }
    descending(
        days.into_iter()
            .map(|(track, dates)| (track, dates.len() as u64))
            .collect(),
    )
}

/// An artist who was only ever heard through one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneHitWonder {
    pub artist: String,
    pub track: String,
    pub plays: u64,
}

/// Artists with at least `min_plays` plays, all of the same track title.
#[must_use]
pub fn one_hit_wonders(events: &[PlayEvent], min_plays: u64) -> Vec<OneHitWonder> {
    let mut artists: IndexMap<String, (HashSet<String>, u64)> = IndexMap::new();
    for event in events {
        let (titles, plays) = artists.entry(event.artist_name.clone()).or_default();
        titles.insert(event.track_name.clone());
        *plays += 1;
    }

    let mut wonders: Vec<OneHitWonder> = artists
        .into_iter()
        .filter(|(_, (titles, plays))| titles.len() == 1 && *plays >= min_plays)
        .filter_map(|(artist, (titles, plays))| {
            titles.into_iter().next().map(|track| OneHitWonder {
                artist,
                track,
                plays,
            })
        })
        .collect();
    wonders.sort_by(|a, b| b.plays.cmp(&a.plays));
    wonders
}

// ============================================================================
// Time windows
// ============================================================================

/// Artists played between 2 and 5 AM.
#[must_use]
pub fn night_shift_artists(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, |e| (2..5).contains(&hour(e)))
}

/// Artists played between 5 and 9 AM.
#[must_use]
pub fn early_bird_artists(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, |e| (5..9).contains(&hour(e)))
}

/// Artists played on workdays between 9 AM and 5 PM.
#[must_use]
pub fn nine_to_five_artists(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, |e| is_workday(weekday(e)) && (9..17).contains(&hour(e)))
}

/// Artists played on workdays during rush hours (7-9 and 17-19).
#[must_use]
pub fn commute_heroes(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, |e| {
        let h = hour(e);
        is_workday(weekday(e)) && ((7..9).contains(&h) || (17..19).contains(&h))
    })
}

/// Tracks played on Friday and Saturday nights, 10 PM to 4 AM.
#[must_use]
pub fn party_animal_tracks(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| {
        let h = hour(e);
        match weekday(e) {
            Weekday::Fri => h >= 22,
            Weekday::Sat => h < 4 || h >= 22,
            Weekday::Sun => h < 4,
            _ => false,
        }
    })
}

/// Tracks played on Sunday evenings from 6 PM.
#[must_use]
pub fn sunday_scaries_tracks(events: &[PlayEvent]) -> Ranking<TrackKey> {
    tracks_where(events, |e| weekday(e) == Weekday::Sun && hour(e) >= 18)
}

/// Artists played in the hour after midnight.
#[must_use]
pub fn midnight_club(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, |e| hour(e) == 0)
}

/// Artists played between noon and 2 PM.
#[must_use]
pub fn lunch_break(events: &[PlayEvent]) -> Ranking<String> {
    artists_where(events, |e| (12..14).contains(&hour(e)))
}

/// Tracks played on a given weekday.
#[must_use]
pub fn top_tracks_on(events: &[PlayEvent], day: Weekday) -> Ranking<TrackKey> {
    tracks_where(events, |e| weekday(e) == day)
}

#[must_use]
pub fn monday_blues(events: &[PlayEvent]) -> Ranking<TrackKey> {
    top_tracks_on(events, Weekday::Mon)
}

#[must_use]
pub fn hump_day_hero(events: &[PlayEvent]) -> Ranking<TrackKey> {
    top_tracks_on(events, Weekday::Wed)
}

/// Artist rankings for workdays and weekends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekSplit {
    pub weekday: Ranking<String>,
    pub weekend: Ranking<String>,
}

#[must_use]
pub fn weekend_vs_weekday(events: &[PlayEvent]) -> WeekSplit {
    WeekSplit {
        weekday: artists_where(events, |e| is_workday(weekday(e))),
        weekend: artists_where(events, |e| !is_workday(weekday(e))),
    }
}

/// An artist mostly played in one four-hour window of the day.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockworkArtist {
    pub artist: String,
    /// First hour of the window (0, 4, 8, 12, 16 or 20).
    pub window_start: u32,
    /// Fraction of the artist's plays inside the window.
    pub share: f64,
}

impl ClockworkArtist {
    /// Label such as `"20:00-24:00"`.
    #[must_use]
    pub fn window_label(&self) -> String {
        format!(
            "{:02}:00-{:02}:00",
            self.window_start,
            self.window_start + CLOCKWORK_WINDOW_HOURS
        )
    }
}

/// Artists with at least 50 plays, 70% or more of which land in the same
/// four-hour window. Artists appear in the order they were first heard.
#[must_use]
pub fn clockwork_artists(events: &[PlayEvent]) -> Vec<ClockworkArtist> {
    let mut windows: IndexMap<String, [u64; 6]> = IndexMap::new();
    for event in events {
        let slot = (hour(event) / CLOCKWORK_WINDOW_HOURS) as usize;
        windows.entry(event.artist_name.clone()).or_default()[slot] += 1;
    }

    windows
        .into_iter()
        .filter_map(|(artist, counts)| {
            let total: u64 = counts.iter().sum();
            if total < CLOCKWORK_MIN_PLAYS {
                return None;
            }
            counts.iter().enumerate().find_map(|(slot, &count)| {
                let share = count as f64 / total as f64;
                (share >= CLOCKWORK_SHARE).then(|| ClockworkArtist {
                    artist: artist.clone(),
                    window_start: slot as u32 * CLOCKWORK_WINDOW_HOURS,
                    share,
                })
            })
        })
        .collect()
}

// ============================================================================
// Alphabet buckets
// ============================================================================

/// Uppercase ASCII initial of `name`, if it starts with a letter.
fn initial(name: &str) -> Option<char> {
    name.chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .filter(char::is_ascii_uppercase)
}

/// Keep the highest-valued entry per initial; earlier entries win ties.
fn best_per_letter<K: Clone>(
    entries: Ranking<K>,
    name: impl Fn(&K) -> &str,
) -> BTreeMap<char, (K, u64)> {
    let mut letters = BTreeMap::new();
    for (key, count) in entries {
        let Some(letter) = initial(name(&key)) else {
            continue;
        };
        match letters.entry(letter) {
            Entry::Vacant(slot) => {
                slot.insert((key, count));
            }
            Entry::Occupied(mut slot) => {
                if count > slot.get().1 {
                    slot.insert((key, count));
                }
            }
        }
    }
    letters
}

/// Most played track for each initial letter.
///
/// Tracks are filed under the initial of their `artist - track` label, so
/// the artist name decides the letter.
#[must_use]
pub fn alphabet_challenge(events: &[PlayEvent]) -> BTreeMap<char, (TrackKey, u64)> {
    let mut counts: IndexMap<TrackKey, u64> = IndexMap::new();
    for event in events {
        *counts.entry(event.track_key()).or_default() += 1;
    }
    best_per_letter(counts.into_iter().collect(), |key: &TrackKey| key.artist.as_str())
}

/// Most played artist for each initial letter.
#[must_use]
pub fn alphabet_artists(events: &[PlayEvent]) -> BTreeMap<char, (String, u64)> {
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for event in events {
        *counts.entry(event.artist_name.clone()).or_default() += 1;
    }
    best_per_letter(counts.into_iter().collect(), String::as_str)
}
