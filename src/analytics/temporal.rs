//! Calendar bucketing and heatmap data
//!
//! Fixed axes (hour of day, weekday, month) are returned as arrays. Axes
//! that depend on the data, such as the years present or the top platforms,
//! are returned alongside the matrix as label vectors.

use std::collections::HashMap;

use chrono::{Datelike, Timelike};
use derive_more::Display;

use super::{platform_usage, play_counts_by_artist, PlaySkips};
use crate::event::PlayEvent;

/// Weekday labels, Monday first, matching the row order of every week grid.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Short month labels, matching the column order of the calendar heatmap.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Platforms kept on the device habits axis.
const DEVICE_HABITS_PLATFORMS: usize = 10;

/// Rows are weekdays (Monday first), columns are hours of the day.
pub type WeekGrid<T> = [[T; 24]; 7];

fn hour_index(event: &PlayEvent) -> usize {
    event.end_time.hour() as usize
}

fn weekday_index(event: &PlayEvent) -> usize {
    event.end_time.weekday().num_days_from_monday() as usize
}

/// Plays per hour of the day.
#[must_use]
pub fn listening_by_hour(events: &[PlayEvent]) -> [u64; 24] {
    let mut hours = [0; 24];
    for event in events {
        hours[hour_index(event)] += 1;
    }
    hours
}

/// Plays per weekday, Monday first.
#[must_use]
pub fn listening_by_day_of_week(events: &[PlayEvent]) -> [u64; 7] {
    let mut days = [0; 7];
    for event in events {
        days[weekday_index(event)] += 1;
    }
    days
}

/// Meteorological season (Northern Hemisphere).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    pub const ALL: [Self; 4] = [Self::Winter, Self::Spring, Self::Summer, Self::Autumn];

    /// Season a calendar month (1-12) falls in.
    #[must_use]
    pub const fn of_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Winter => 0,
            Self::Spring => 1,
            Self::Summer => 2,
            Self::Autumn => 3,
        }
    }
}

/// Plays per season, in `Season::ALL` order.
#[must_use]
pub fn seasonal_listening(events: &[PlayEvent]) -> [(Season, u64); 4] {
    let mut counts = Season::ALL.map(|season| (season, 0));
    for event in events {
        counts[Season::of_month(event.end_time.month()).index()].1 += 1;
    }
    counts
}

/// Plays during the day (6 AM to 6 PM) and at night.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DayNight {
    pub day: u64,
    pub night: u64,
}

#[must_use]
pub fn day_night_split(events: &[PlayEvent]) -> DayNight {
    events.iter().fold(DayNight::default(), |mut split, event| {
        if (6..18).contains(&event.end_time.hour()) {
            split.day += 1;
        } else {
            split.night += 1;
        }
        split
    })
}

fn week_grid(events: &[PlayEvent], include: impl Fn(&PlayEvent) -> bool) -> WeekGrid<u64> {
    let mut grid = [[0; 24]; 7];
    for event in events {
        if include(event) {
            grid[weekday_index(event)][hour_index(event)] += 1;
        }
    }
    grid
}

/// Plays per weekday and hour.
#[must_use]
pub fn hourly_heatmap_data(events: &[PlayEvent]) -> WeekGrid<u64> {
    week_grid(events, |_| true)
}

/// Deliberately started plays per weekday and hour.
#[must_use]
pub fn active_listening_heatmap_data(events: &[PlayEvent]) -> WeekGrid<u64> {
    week_grid(events, PlayEvent::is_active_start)
}

/// Skip percentage per weekday and hour. Empty cells are zero.
#[must_use]
pub fn picky_grid_data(events: &[PlayEvent]) -> WeekGrid<f64> {
    let mut cells = [[PlaySkips::default(); 24]; 7];
    for event in events {
        cells[weekday_index(event)][hour_index(event)].record(event.is_skipped());
    }
    cells.map(|row| row.map(PlaySkips::skip_rate))
}

/// Plays per year and month.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarHeatmap {
    /// Years present in the history, ascending.
    pub years: Vec<i32>,
    /// One row per year, January first.
    pub counts: Vec<[u64; 12]>,
}

#[must_use]
pub fn calendar_heatmap_data(events: &[PlayEvent]) -> CalendarHeatmap {
    let mut years: Vec<i32> = events.iter().map(|e| e.end_time.year()).collect();
    years.sort_unstable();
    years.dedup();

    let mut counts = vec![[0; 12]; years.len()];
    for event in events {
        if let Ok(row) = years.binary_search(&event.end_time.year()) {
            counts[row][event.end_time.month0() as usize] += 1;
        }
    }
    CalendarHeatmap { years, counts }
}

/// Plays per platform and hour, for the most used platforms only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceHabits {
    /// Up to ten platforms, most used first.
    pub platforms: Vec<String>,
    pub counts: Vec<[u64; 24]>,
}

/// Plays on platforms outside the top ten are left out.
#[must_use]
pub fn device_habits_data(events: &[PlayEvent]) -> DeviceHabits {
    let platforms: Vec<String> = platform_usage(events)
        .into_iter()
        .take(DEVICE_HABITS_PLATFORMS)
        .map(|(platform, _)| platform)
        .collect();
    let rows: HashMap<&str, usize> = platforms
        .iter()
        .enumerate()
        .map(|(row, platform)| (platform.as_str(), row))
        .collect();

    let mut counts = vec![[0; 24]; platforms.len()];
    for event in events {
        if let Some(&row) = rows.get(event.platform.as_str()) {
            counts[row][hour_index(event)] += 1;
        }
    }
    DeviceHabits { platforms, counts }
}

/// Monthly plays of the top artists across the whole history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtistEras {
    /// Most played artists, one per row.
    pub artists: Vec<String>,
    /// Every month from the first play to the last, as `YYYY-MM`.
    pub months: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

/// Months from `first` to `last` inclusive, as `(year, month)` pairs.
fn month_span(first: (i32, u32), last: (i32, u32)) -> Vec<(i32, u32)> {
    let mut months = Vec::new();
    let (mut year, mut month) = first;
    while (year, month) <= last {
        months.push((year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }
    months
}

/// Per-month plays of the `top_n` most played artists.
///
/// With `normalize`, each row is divided by its own peak month so every
/// artist's busiest month reads 1.0.
#[must_use]
pub fn artist_eras_data(events: &[PlayEvent], top_n: usize, normalize: bool) -> ArtistEras {
    let (Some(first), Some(last)) = (
        events.iter().map(|e| e.end_time).min(),
        events.iter().map(|e| e.end_time).max(),
    ) else {
        return ArtistEras::default();
    };

    let artists: Vec<String> = play_counts_by_artist(events)
        .into_iter()
        .take(top_n)
        .map(|(artist, _)| artist)
        .collect();
    let span = month_span((first.year(), first.month()), (last.year(), last.month()));

    let rows: HashMap<&str, usize> = artists
        .iter()
        .enumerate()
        .map(|(row, artist)| (artist.as_str(), row))
        .collect();
    let columns: HashMap<(i32, u32), usize> = span
        .iter()
        .enumerate()
        .map(|(column, &month)| (month, column))
        .collect();

    let mut values = vec![vec![0.0; span.len()]; artists.len()];
    for event in events {
        let month = (event.end_time.year(), event.end_time.month());
        let row = rows.get(event.artist_name.as_str());
        if let (Some(&row), Some(&column)) = (row, columns.get(&month)) {
            values[row][column] += 1.0;
        }
    }

    if normalize {
        for row in &mut values {
            let peak = row.iter().copied().fold(0.0, f64::max);
            if peak > 0.0 {
                row.iter_mut().for_each(|value| *value /= peak);
            }
        }
    }

    ArtistEras {
        artists,
        months: span
            .into_iter()
            .map(|(year, month)| format!("{year}-{month:02}"))
            .collect(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, play};

    #[test]
    fn test_by_hour_and_weekday() {
        // 2024-01-01 is a Monday.
        let events = vec![
            play("A", "1").ended(at(2024, 1, 1, 0, 10)).build(),
            play("A", "2").ended(at(2024, 1, 1, 23, 50)).build(),
            play("A", "3").ended(at(2024, 1, 7, 23, 0)).build(),
        ];
        let hours = listening_by_hour(&events);
        assert_eq!(hours[0], 1);
        assert_eq!(hours[23], 2);
        assert_eq!(hours.iter().sum::<u64>(), 3);

        let days = listening_by_day_of_week(&events);
        assert_eq!(days, [2, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(listening_by_hour(&[]), [0; 24]);
        assert_eq!(calendar_heatmap_data(&[]), CalendarHeatmap::default());
        assert_eq!(device_habits_data(&[]), DeviceHabits::default());
        assert_eq!(artist_eras_data(&[], 20, true), ArtistEras::default());
        assert_eq!(day_night_split(&[]), DayNight::default());
    }

    #[test]
    fn test_seasons() {
        assert_eq!(Season::of_month(12), Season::Winter);
        assert_eq!(Season::of_month(2), Season::Winter);
        assert_eq!(Season::of_month(4), Season::Spring);
        assert_eq!(Season::of_month(7), Season::Summer);
        assert_eq!(Season::of_month(10), Season::Autumn);
        assert_eq!(Season::Autumn.to_string(), "Autumn");

        let events = vec![
            play("A", "1").ended(at(2023, 12, 24, 9, 0)).build(),
            play("A", "2").ended(at(2024, 1, 5, 9, 0)).build(),
            play("A", "3").ended(at(2024, 8, 5, 9, 0)).build(),
        ];
        assert_eq!(
            seasonal_listening(&events),
            [
                (Season::Winter, 2),
                (Season::Spring, 0),
                (Season::Summer, 1),
                (Season::Autumn, 0),
            ]
        );
    }

    #[test]
    fn test_day_night_split_boundaries() {
        let events = vec![
            play("A", "1").ended(at(2024, 1, 1, 6, 0)).build(),
            play("A", "2").ended(at(2024, 1, 1, 17, 59)).build(),
            play("A", "3").ended(at(2024, 1, 1, 18, 0)).build(),
            play("A", "4").ended(at(2024, 1, 1, 5, 59)).build(),
        ];
        assert_eq!(day_night_split(&events), DayNight { day: 2, night: 2 });
    }

    #[test]
    fn test_week_grids() {
        // 2024-01-03 is a Wednesday.
        let events = vec![
            play("A", "1").ended(at(2024, 1, 3, 14, 0)).reason_start("clickrow").build(),
            play("A", "2").ended(at(2024, 1, 3, 14, 30)).skip().build(),
        ];
        let grid = hourly_heatmap_data(&events);
        assert_eq!(grid[2][14], 2);

        let active = active_listening_heatmap_data(&events);
        assert_eq!(active[2][14], 1);

        let picky = picky_grid_data(&events);
        assert!((picky[2][14] - 50.0).abs() < 1e-9);
        assert!(picky[0][0].abs() < f64::EPSILON);
    }

    #[test]
    fn test_calendar_heatmap_only_years_present() {
        let events = vec![
            play("A", "1").ended(at(2019, 3, 1, 9, 0)).build(),
            play("A", "2").ended(at(2022, 3, 1, 9, 0)).build(),
            play("A", "3").ended(at(2022, 12, 1, 9, 0)).build(),
        ];
        let heatmap = calendar_heatmap_data(&events);
        assert_eq!(heatmap.years, vec![2019, 2022]);
        assert_eq!(heatmap.counts[0][2], 1);
        assert_eq!(heatmap.counts[1][2], 1);
        assert_eq!(heatmap.counts[1][11], 1);
    }

    #[test]
    fn test_device_habits_caps_platforms() {
        let mut events = Vec::new();
        for i in 0..12 {
            for _ in 0..(12 - i) {
                let platform = format!("device{i}");
                events.push(play("A", "1").platform(&platform).ended(at(2024, 1, 1, 8, 0)).build());
            }
        }
        let habits = device_habits_data(&events);
        assert_eq!(habits.platforms.len(), 10);
        assert_eq!(habits.platforms[0], "device0");
        assert_eq!(habits.counts[0][8], 12);
        assert!(!habits.platforms.contains(&"device11".to_string()));
    }

    #[test]
    fn test_artist_eras_normalized() {
        let events = vec![
            play("A", "1").ended(at(2023, 11, 1, 9, 0)).build(),
            play("A", "1").ended(at(2023, 11, 2, 9, 0)).build(),
            play("A", "1").ended(at(2024, 1, 2, 9, 0)).build(),
            play("B", "1").ended(at(2024, 1, 3, 9, 0)).build(),
        ];
        let eras = artist_eras_data(&events, 20, true);
        assert_eq!(eras.artists, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(eras.months, vec!["2023-11", "2023-12", "2024-01"]);
        assert_eq!(eras.values[0], vec![1.0, 0.0, 0.5]);
        assert_eq!(eras.values[1], vec![0.0, 0.0, 1.0]);

        let raw = artist_eras_data(&events, 1, false);
        assert_eq!(raw.artists.len(), 1);
        assert_eq!(raw.values[0], vec![2.0, 0.0, 1.0]);
    }
}
