//! Discovery and time-series aggregations
//!
//! These follow entities (mostly artists) through time, so they work on a
//! chronologically sorted view of the history.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Duration, NaiveDateTime};
use indexmap::IndexMap;

use super::{ascending, best, descending, Ranking};
use crate::event::{sorted_by_end_time, PlayEvent};
use crate::types::TrackKey;

/// An artist needs more plays than this before the cutoff to be a forgotten favorite.
const FORGOTTEN_MIN_PLAYS: u64 = 20;
/// Plays an artist needs in its best week to be a one-week wonder.
const WONDER_WEEK_MIN_PLAYS: u64 = 50;
/// Plays allowed across every other week for a one-week wonder.
const WONDER_OTHER_MAX_PLAYS: u64 = 10;

/// `YYYY-MM` label for the month of `time`.
fn month_label(time: NaiveDateTime) -> String {
    time.format("%Y-%m").to_string()
}

/// `YYYY-Www` label for the ISO week of `time`.
fn week_label(time: NaiveDateTime) -> String {
    let week = time.iso_week();
    format!("{}-W{:02}", week.year(), week.week())
}

/// End times of every play, grouped by artist in first-heard order.
fn timestamps_by_artist(events: &[PlayEvent]) -> Vec<(String, Vec<NaiveDateTime>)> {
    let mut artists: IndexMap<String, Vec<NaiveDateTime>> = IndexMap::new();
    for event in events {
        artists
            .entry(event.artist_name.clone())
            .or_default()
            .push(event.end_time);
    }
    artists.into_iter().collect()
}

/// Plays per year for each of `top_artists`, in the order given.
#[must_use]
pub fn artist_history_over_time(
    events: &[PlayEvent],
    top_artists: &[String],
) -> Vec<(String, BTreeMap<i32, u64>)> {
    let rows: HashMap<&str, usize> = top_artists
        .iter()
        .enumerate()
        .map(|(row, artist)| (artist.as_str(), row))
        .collect();
    let mut history: Vec<(String, BTreeMap<i32, u64>)> = top_artists
        .iter()
        .map(|artist| (artist.clone(), BTreeMap::new()))
        .collect();

    for event in events {
        if let Some(&row) = rows.get(event.artist_name.as_str()) {
            *history[row].1.entry(event.end_time.year()).or_default() += 1;
        }
    }
    history
}

/// New artists heard for the first time, per month.
#[must_use]
pub fn discovery_rate(events: &[PlayEvent]) -> BTreeMap<String, u64> {
    let mut seen = HashSet::new();
    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for event in sorted_by_end_time(events) {
        if seen.insert(event.artist_name.as_str()) {
            *months.entry(month_label(event.end_time)).or_default() += 1;
        }
    }
    months
}

/// The month with the most discoveries. The earliest month wins a tie.
#[must_use]
pub fn discovery_peak(events: &[PlayEvent]) -> Option<(String, u64)> {
    let months = discovery_rate(events);
    best(months.iter()).map(|(month, &count)| (month.clone(), count))
}

/// Days each artist took to go from its first play to its `target`-th play.
///
/// Only artists that reached `target` plays are listed, fastest first.
#[must_use]
pub fn listening_velocity(events: &[PlayEvent], target: usize) -> Ranking<String, i64> {
    if target == 0 {
        return Vec::new();
    }
    let velocity = timestamps_by_artist(events)
        .into_iter()
        .filter(|(_, times)| times.len() >= target)
        .map(|(artist, mut times)| {
            times.sort_unstable();
            (artist, (times[target - 1] - times[0]).num_days())
        })
        .collect();
    ascending(velocity)
}

/// Longest absence, in whole days, for each artist that stayed away for at
/// least `gap_days`. Longest absence first.
#[must_use]
pub fn the_comeback(events: &[PlayEvent], gap_days: i64) -> Ranking<String, i64> {
    let comebacks = timestamps_by_artist(events)
        .into_iter()
        .filter(|(_, times)| times.len() >= 2)
        .filter_map(|(artist, mut times)| {
            times.sort_unstable();
            let longest = times
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).num_days())
                .max()
                .unwrap_or(0);
            (longest >= gap_days).then_some((artist, longest))
        })
        .collect();
    descending(comebacks)
}

/// An artist that was binged for one week and barely heard otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekWonder {
    pub artist: String,
    /// ISO week label, `YYYY-Www`.
    pub week: String,
    pub plays: u64,
}

/// Artists with more than 50 plays in a single ISO week and fewer than 10
/// in all other weeks combined, in first-heard order.
#[must_use]
pub fn one_week_wonders(events: &[PlayEvent]) -> Vec<WeekWonder> {
    let mut artists: IndexMap<String, IndexMap<String, u64>> = IndexMap::new();
    for event in events {
        *artists
            .entry(event.artist_name.clone())
            .or_default()
            .entry(week_label(event.end_time))
            .or_default() += 1;
    }

    artists
        .into_iter()
        .filter_map(|(artist, weeks)| {
            let total: u64 = weeks.iter().map(|(_, &count)| count).sum();
            let (week, &plays) = best(weeks.iter())?;
            (plays > WONDER_WEEK_MIN_PLAYS && total - plays < WONDER_OTHER_MAX_PLAYS).then(|| {
                WeekWonder {
                    artist,
                    week: week.clone(),
                    plays,
                }
            })
        })
        .collect()
}

/// Artists with more than 20 plays before a cutoff and none after it.
///
/// The cutoff is `months * 30` days before the last play in the history.
/// A cutoff before the earliest representable date leaves nothing to forget.
#[must_use]
pub fn forgotten_favorites(events: &[PlayEvent], months: i64) -> Ranking<String> {
    let Some(last) = events.iter().map(|e| e.end_time).max() else {
        return Vec::new();
    };
    let Some(cutoff) = Duration::try_days(months.saturating_mul(30))
        .and_then(|span| last.checked_sub_signed(span))
    else {
        return Vec::new();
    };

    let mut recent = HashSet::new();
    let mut past: IndexMap<&str, u64> = IndexMap::new();
    for event in sorted_by_end_time(events) {
        if event.end_time > cutoff {
            recent.insert(event.artist_name.as_str());
        } else {
            *past.entry(event.artist_name.as_str()).or_default() += 1;
        }
    }

    descending(
        past.into_iter()
            .filter(|(artist, count)| *count > FORGOTTEN_MIN_PLAYS && !recent.contains(artist))
            .map(|(artist, count)| (artist.to_string(), count))
            .collect(),
    )
}

/// The last play of one year and the first of the next year present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTransition<'a> {
    pub last_of_year: &'a PlayEvent,
    pub first_of_next: &'a PlayEvent,
}

/// Transitions between each pair of consecutive years in the history,
/// keyed by the earlier year.
#[must_use]
pub fn new_years_transitions(events: &[PlayEvent]) -> BTreeMap<i32, YearTransition<'_>> {
    let sorted = sorted_by_end_time(events);
    sorted
        .windows(2)
        .filter(|pair| pair[0].end_time.year() != pair[1].end_time.year())
        .map(|pair| {
            (
                pair[0].end_time.year(),
                YearTransition {
                    last_of_year: pair[0],
                    first_of_next: pair[1],
                },
            )
        })
        .collect()
}

/// Most played artist in each month. The first artist heard wins a tie.
#[must_use]
pub fn top_artist_per_month(events: &[PlayEvent]) -> BTreeMap<String, (String, u64)> {
    let mut months: BTreeMap<String, IndexMap<&str, u64>> = BTreeMap::new();
    for event in events {
        *months
            .entry(month_label(event.end_time))
            .or_default()
            .entry(event.artist_name.as_str())
            .or_default() += 1;
    }
    months
        .into_iter()
        .filter_map(|(month, artists)| {
            best(artists.iter()).map(|(&artist, &count)| (month, (artist.to_string(), count)))
        })
        .collect()
}

/// Most played track in each calendar quarter, Q1 first.
#[must_use]
pub fn quarterly_review(events: &[PlayEvent]) -> [Option<(TrackKey, u64)>; 4] {
    let mut quarters: [IndexMap<TrackKey, u64>; 4] = Default::default();
    for event in events {
        *quarters[event.end_time.month0() as usize / 3]
            .entry(event.track_key())
            .or_default() += 1;
    }
    quarters.map(|tracks| best(tracks.iter()).map(|(track, &count)| (track.clone(), count)))
}
