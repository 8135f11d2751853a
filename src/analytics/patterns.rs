//! Classification by track, artist and album names

use std::collections::HashSet;

use indexmap::IndexMap;

use super::{count_by, descending, percentage, Ranking};
use crate::event::PlayEvent;
use crate::types::TrackKey;

const COLLABORATION_MARKERS: [&str; 4] = ["feat.", "ft.", "with ", "featuring"];
const REMIX_MARKERS: [&str; 6] = ["remix", " mix", " edit", "club", "vip", "dub"];
const LIVE_MARKERS: [&str; 5] = ["live", "concert", "performance", "session", "tour"];

/// Titles too generic to say anything about shared names.
const GENERIC_TITLES: [&str; 4] = ["intro", "untitled", "track 1", "outro"];

fn mentions_any(text: &str, markers: &[&str]) -> bool {
    let text = text.to_lowercase();
    markers.iter().any(|marker| text.contains(marker))
}

/// Share of plays whose names match a marker.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NameShare {
    /// Percentage of all plays.
    pub percent: f64,
    pub plays: u64,
}

fn share_where(events: &[PlayEvent], matches: impl Fn(&PlayEvent) -> bool) -> NameShare {
    let plays = events.iter().filter(|e| matches(e)).count() as u64;
    NameShare {
        percent: percentage(plays, events.len() as u64),
        plays,
    }
}

/// Tracks crediting more than one artist.
#[must_use]
pub fn collaborator(events: &[PlayEvent]) -> Ranking<TrackKey> {
    count_by(
        events,
        |e| mentions_any(&format!("{} {}", e.track_name, e.artist_name), &COLLABORATION_MARKERS),
        PlayEvent::track_key,
    )
}

/// Plays of remixes, edits and similar versions.
#[must_use]
pub fn remix_junkie(events: &[PlayEvent]) -> NameShare {
    share_where(events, |e| mentions_any(&e.track_name, &REMIX_MARKERS))
}

/// Plays of live recordings, judged by track or album name.
#[must_use]
pub fn live_fanatic(events: &[PlayEvent]) -> NameShare {
    share_where(events, |e| {
        mentions_any(&format!("{} {}", e.track_name, e.album_name), &LIVE_MARKERS)
    })
}

/// The longest artist name and track title, counted in characters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LongestNames {
    pub artist: String,
    pub track: String,
}

impl LongestNames {
    #[must_use]
    pub fn artist_len(&self) -> usize {
        self.artist.chars().count()
    }

    #[must_use]
    pub fn track_len(&self) -> usize {
        self.track.chars().count()
    }
}

/// Earlier names win ties.
#[must_use]
pub fn spelling_bee(events: &[PlayEvent]) -> LongestNames {
    let mut longest = LongestNames::default();
    for event in events {
        if event.artist_name.chars().count() > longest.artist_len() {
            longest.artist.clone_from(&event.artist_name);
        }
        if event.track_name.chars().count() > longest.track_len() {
            longest.track.clone_from(&event.track_name);
        }
    }
    longest
}

/// Track titles recorded by more than one artist, ranked by how many.
///
/// Titles are compared after trimming surrounding whitespace.
#[must_use]
pub fn same_name_game(events: &[PlayEvent]) -> Ranking<String> {
    let mut titles: IndexMap<&str, HashSet<&str>> = IndexMap::new();
    for event in events {
        let title = event.track_name.trim();
        if GENERIC_TITLES.contains(&title.to_lowercase().as_str()) {
            continue;
        }
        titles
            .entry(title)
            .or_default()
            .insert(event.artist_name.as_str());
    }
    descending(
        titles
            .into_iter()
            .filter(|(_, artists)| artists.len() > 1)
            .map(|(title, artists)| (title.to_string(), artists.len() as u64))
            .collect(),
    )
}
