//! Analytics and statistics module
//!
//! Every aggregation is a pure function over a slice of [`PlayEvent`]s.
//! None of them mutate or reorder the caller's slice; the ones that need
//! chronological order sort a local list of references.
//!
//! Conventions shared by all families:
//! - Rankings are `Vec<(key, value)>` ordered by value, highest first.
//!   Equal values keep the order in which their key was first seen.
//! - Empty input yields an empty ranking, a zeroed struct, or `None`.
//! - Minimum-sample filters are applied before any division.

pub mod discovery;
pub mod overview;
pub mod patterns;
pub mod ranking;
pub mod rates;
pub mod sessions;
pub mod songs;
pub mod streaks;
pub mod temporal;

use std::cmp::Ordering;
use std::hash::Hash;

use indexmap::IndexMap;

use crate::event::PlayEvent;

pub use discovery::*;
pub use overview::*;
pub use patterns::*;
pub use ranking::*;
pub use rates::*;
pub use sessions::*;
pub use songs::*;
pub use streaks::*;
pub use temporal::*;

/// Ordered `(key, value)` pairs, best first.
pub type Ranking<K, V = u64> = Vec<(K, V)>;

/// Entries of `map` ordered by value, highest first, ties in first-seen order.
pub(crate) fn ranked<K, V: PartialOrd>(map: IndexMap<K, V>) -> Ranking<K, V> {
    descending(map.into_iter().collect())
}

/// Stable sort, highest value first.
pub(crate) fn descending<K, V: PartialOrd>(mut entries: Vec<(K, V)>) -> Vec<(K, V)> {
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    entries
}

/// Stable sort, lowest value first.
pub(crate) fn ascending<K, V: PartialOrd>(mut entries: Vec<(K, V)>) -> Vec<(K, V)> {
    entries.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    entries
}

/// Highest-valued entry; the earliest one wins a tie.
pub(crate) fn best<'a, K, V, I>(entries: I) -> Option<(&'a K, &'a V)>
where
    K: 'a,
    V: PartialOrd + 'a,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    entries.into_iter().fold(None, |best, (k, v)| match best {
        Some((_, best_v)) if v <= best_v => best,
        _ => Some((k, v)),
    })
}

/// Count plays matching `include`, grouped by `key`.
pub(crate) fn count_by<K, P, F>(events: &[PlayEvent], include: P, key: F) -> Ranking<K>
where
    K: Eq + Hash,
    P: Fn(&PlayEvent) -> bool,
    F: Fn(&PlayEvent) -> K,
{
    let mut counts: IndexMap<K, u64> = IndexMap::new();
    for event in events {
        if include(event) {
            *counts.entry(key(event)).or_default() += 1;
        }
    }
    ranked(counts)
}

/// `part / total` as a percentage, zero when `total` is zero.
pub(crate) fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Plays and skips for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct PlaySkips {
    pub plays: u64,
    pub skips: u64,
}

impl PlaySkips {
    pub(crate) fn record(&mut self, skipped: bool) {
        self.plays += 1;
        if skipped {
            self.skips += 1;
        }
    }

    pub(crate) fn skip_rate(self) -> f64 {
        percentage(self.skips, self.plays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::play;

    #[test]
    fn test_ranked_keeps_first_seen_order_on_ties() {
        let mut counts: IndexMap<&str, u64> = IndexMap::new();
        for key in ["b", "a", "c", "a", "b"] {
            *counts.entry(key).or_default() += 1;
        }
        assert_eq!(ranked(counts), vec![("b", 2), ("a", 2), ("c", 1)]);
    }

    #[test]
    fn test_ascending_and_descending_are_stable() {
        let entries = vec![("a", 1.0), ("b", 2.0), ("c", 1.0)];
        assert_eq!(descending(entries.clone()), vec![("b", 2.0), ("a", 1.0), ("c", 1.0)]);
        assert_eq!(ascending(entries), vec![("a", 1.0), ("c", 1.0), ("b", 2.0)]);
    }

    #[test]
    fn test_best_prefers_first_on_tie() {
        let entries = [("a", 3), ("b", 5), ("c", 5)];
        let best = best(entries.iter().map(|(k, v)| (k, v)));
        assert_eq!(best, Some((&"b", &5)));
        assert_eq!(super::best::<&str, i32, _>(std::iter::empty()), None);
    }

    #[test]
    fn test_count_by_filters_and_groups() {
        let events = vec![
            play("A", "1").build(),
            play("B", "1").skip().build(),
            play("A", "2").skip().build(),
        ];
        let skipped = count_by(&events, PlayEvent::is_skipped, |e| e.artist_name.clone());
        assert_eq!(skipped, vec![("B".to_string(), 1), ("A".to_string(), 1)]);
    }

    #[test]
    fn test_percentage_of_zero_total() {
        assert!(percentage(3, 0).abs() < f64::EPSILON);
        assert!((percentage(1, 4) - 25.0).abs() < f64::EPSILON);
    }
}
