//! Text report over a loaded history
//!
//! [`write_report`] runs every aggregation over the plays it is given and
//! writes one section per statistic. The output goes to any [`io::Write`],
//! so callers choose between stdout, a file, or both through [`Tee`].

use std::io::{self, Write};

use chrono::NaiveDateTime;
use tracing::debug;

use crate::analytics::{self, Ranking, WeekGrid, MONTH_NAMES, WEEKDAY_NAMES};
use crate::config::{AnalysisConfig, Config};
use crate::date_range::DateRange;
use crate::display::{
    format_hours_minutes, format_span, truncate, write_histogram, write_ranking, write_section,
    write_section_simple, RULE_WIDTH,
};
use crate::error::Result;
use crate::event::PlayEvent;
use crate::types::Milliseconds;

/// Timestamp format used throughout the report.
const REPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Top artists profiled in the traits section.
const PROFILED_ARTISTS: usize = 5;

/// Width of the bars in the hour and weekday charts.
const HISTOGRAM_WIDTH: usize = 30;

/// Writer that copies everything into two sinks.
#[derive(Debug)]
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Write, B: Write> Tee<A, B> {
    pub const fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: Write, B: Write> Write for Tee<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.first.write_all(buf)?;
        self.second.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.first.flush()?;
        self.second.flush()
    }
}

fn plays(v: &u64) -> String {
    format!("{v:4} plays")
}

fn percent(v: &f64) -> String {
    format!("{v:5.1}%")
}

fn ratio(v: &f64) -> String {
    format!("{v:.2}")
}

fn hours(v: &Milliseconds) -> String {
    format_hours_minutes(*v)
}

fn days(v: &i64) -> String {
    format!("{v:4} days")
}

fn stamp(time: NaiveDateTime) -> String {
    time.format(REPORT_TIMESTAMP_FORMAT).to_string()
}

fn stamp_or_dash(time: Option<NaiveDateTime>) -> String {
    time.map_or_else(|| "-".to_string(), stamp)
}

/// Write the full report for `events`, which should already be narrowed to
/// `range`.
pub fn write_report<W: Write>(
    out: &mut W,
    events: &[PlayEvent],
    range: &DateRange,
    config: &Config,
) -> Result<()> {
    let limit = config.report.limit;
    let analysis = &config.analysis;

    write_section(out, &format!("LISTENING STATS - {}", range.display_name.to_uppercase()))?;

    if events.is_empty() {
        writeln!(out, "\nNo listening data found for this period.")?;
        return Ok(());
    }

    debug!("Writing report over {} plays", events.len());

    write_overview(out, events, range)?;
    write_top_lists(out, events, limit, analysis)?;
    write_time_of_day(out, events, limit)?;
    write_skips_and_choices(out, events, limit, analysis)?;
    write_streaks(out, events, limit, analysis)?;
    write_discovery(out, events, limit, analysis)?;
    write_sessions(out, events, limit, analysis)?;
    write_names(out, events, limit)?;
    write_charts(out, events, limit, analysis)?;

    writeln!(out, "\n{}\n", "=".repeat(RULE_WIDTH))?;
    out.flush()?;
    Ok(())
}

fn write_overview<W: Write>(out: &mut W, events: &[PlayEvent], range: &DateRange) -> io::Result<()> {
    write_section_simple(out, "OVERVIEW")?;
    if let Some((first, last)) = analytics::history_range(events) {
        writeln!(out, "  From {} to {}", stamp(first), stamp(last))?;
    }

    let total = analytics::play_time(events, range);
    writeln!(
        out,
        "  Total play time:  {} ({} minutes)",
        format_span(total.to_duration()),
        total.get() / 60_000
    )?;
    writeln!(out, "  Total plays:      {}", events.len())?;

    let skips = analytics::skipped_ratio(events);
    writeln!(
        out,
        "  Skipped:          {} (not skipped: {})",
        skips.skipped, skips.not_skipped
    )
}

fn write_top_lists<W: Write>(
    out: &mut W,
    events: &[PlayEvent],
    limit: usize,
    analysis: &AnalysisConfig,
) -> io::Result<()> {
    write_section_simple(out, "TOP TRACKS")?;
    write_ranking(out, &analytics::play_counts(events), limit, plays)?;

    write_section_simple(out, "TOP ARTISTS")?;
    write_ranking(out, &analytics::play_counts_by_artist(events), limit, plays)?;

    write_section_simple(out, "TOP ALBUMS")?;
    write_ranking(out, &analytics::play_counts_by_album(events), limit, plays)?;

    write_section_simple(out, "PLATFORMS")?;
    write_ranking(out, &analytics::platform_usage(events), limit, plays)?;

    write_section_simple(out, "LOCATIONS")?;
    write_ranking(out, &analytics::location_counts(events), limit, plays)?;

    write_section_simple(out, "TOP ARTISTS BY TIME PLAYED")?;
    write_ranking(out, &analytics::longest_played_artist(events), limit, hours)?;

    write_section_simple(out, "TOP TRACKS BY TIME PLAYED")?;
    write_ranking(out, &analytics::longest_played_tracks(events), limit, hours)?;

    write_section_simple(out, "CONSISTENCY KING (most distinct days)")?;
    write_ranking(out, &analytics::consistency_king(events), limit, days_u64)?;

    write_section_simple(out, "MARATHON TRACKS (over 5 minutes)")?;
    write_ranking(out, &analytics::marathon_tracks(events), limit, plays)?;

    write_section_simple(out, "SHORT KING (finished, under 2 minutes)")?;
    write_ranking(out, &analytics::short_king(events), limit, plays)?;

    write_section_simple(out, "EPIC SAGA (finished, over 7 minutes)")?;
    write_ranking(out, &analytics::epic_saga(events), limit, plays)?;

    write_section_simple(out, "MANUAL LABORER (picked from a list)")?;
    write_ranking(out, &analytics::manual_laborer(events), limit, plays)?;

    write_section_simple(out, "SHUFFLE ROULETTE")?;
    write_ranking(out, &analytics::shuffle_roulette(events), limit, plays)?;

    write_section_simple(out, "ONE-HIT WONDERS")?;
    let wonders = analytics::one_hit_wonders(events, analysis.one_hit_min_plays);
    if wonders.is_empty() {
        writeln!(out, "  -")?;
    }
    for (i, wonder) in wonders.iter().take(limit).enumerate() {
        writeln!(
            out,
            "  #{:2} - {} : {} ({} plays)",
            i + 1,
            wonder.artist,
            wonder.track,
            wonder.plays
        )?;
    }

    write_section_simple(out, "LONGEST ARTIST RELATIONSHIPS")?;
    write_ranking(
        out,
        &analytics::longest_artist_relationship(events),
        limit,
        |span: &chrono::Duration| format!("{:4} days", span.num_days()),
    )?;

    write_section_simple(out, "RECORD DAYS")?;
    match analytics::most_musical_day(events) {
        Some((day, listened)) => {
            writeln!(out, "  Most musical day: {day} ({})", format_hours_minutes(listened))?;
        }
        None => writeln!(out, "  Most musical day: -")?,
    }
    if let Some(record) = analytics::single_day_record(events) {
        writeln!(
            out,
            "  Single-day artist record: {} on {} ({})",
            record.artist,
            record.date,
            format_hours_minutes(record.listened)
        )?;
    }

    write_section_simple(out, "THE ALPHABET CHALLENGE")?;
    let tracks = analytics::alphabet_challenge(events);
    let artists = analytics::alphabet_artists(events);
    for letter in 'A'..='Z' {
        let track = tracks
            .get(&letter)
            .map_or_else(|| "-".to_string(), |(key, count)| format!("{key} ({count})"));
        let artist = artists
            .get(&letter)
            .map_or_else(|| "-".to_string(), |(name, count)| format!("{name} ({count})"));
        writeln!(out, "  {letter}: {:<45} | {}", truncate(&track, 45), artist)?;
    }
    Ok(())
}

fn days_u64(v: &u64) -> String {
    format!("{v:4} days")
}

fn write_time_of_day<W: Write>(out: &mut W, events: &[PlayEvent], limit: usize) -> io::Result<()> {
    let artist_windows: [(&str, Ranking<String>); 6] = [
        ("THE NIGHT SHIFT (2-5 AM)", analytics::night_shift_artists(events)),
        ("THE EARLY BIRD (5-9 AM)", analytics::early_bird_artists(events)),
        ("THE 9-TO-5 (weekdays 9 AM-5 PM)", analytics::nine_to_five_artists(events)),
        ("COMMUTE HEROES (weekdays 7-9 AM and 5-7 PM)", analytics::commute_heroes(events)),
        ("MIDNIGHT CLUB (midnight-1 AM)", analytics::midnight_club(events)),
        ("LUNCH BREAK (noon-2 PM)", analytics::lunch_break(events)),
    ];
    for (title, ranking) in &artist_windows {
        write_section_simple(out, title)?;
        write_ranking(out, ranking, limit, plays)?;
    }

    let track_windows = [
        ("THE PARTY ANIMAL (Fri/Sat 10 PM-4 AM)", analytics::party_animal_tracks(events)),
        ("THE SUNDAY SCARIES (Sun after 6 PM)", analytics::sunday_scaries_tracks(events)),
        ("MONDAY BLUES", analytics::monday_blues(events)),
        ("HUMP DAY HERO", analytics::hump_day_hero(events)),
    ];
    for (title, ranking) in &track_windows {
        write_section_simple(out, title)?;
        write_ranking(out, ranking, limit, plays)?;
    }

    let split = analytics::weekend_vs_weekday(events);
    write_section_simple(out, "WEEKDAY ARTISTS")?;
    write_ranking(out, &split.weekday, limit, plays)?;
    write_section_simple(out, "WEEKEND ARTISTS")?;
    write_ranking(out, &split.weekend, limit, plays)?;

    write_section_simple(out, "CLOCKWORK ARTISTS (70% of plays in one 4-hour window)")?;
    let clockwork = analytics::clockwork_artists(events);
    if clockwork.is_empty() {
        writeln!(out, "  -")?;
    }
    for (i, artist) in clockwork.iter().take(limit).enumerate() {
        writeln!(
            out,
            "  #{:2} - {} ({:.0}%) : {}",
            i + 1,
            artist.window_label(),
            artist.share * 100.0,
            artist.artist
        )?;
    }
    Ok(())
}

fn write_skips_and_choices<W: Write>(
    out: &mut W,
    events: &[PlayEvent],
    limit: usize,
    analysis: &AnalysisConfig,
) -> io::Result<()> {
    write_section_simple(out, "MOST SKIPPED ARTISTS")?;
    write_ranking(out, &analytics::most_skipped_artist(events), limit, plays)?;

    write_section_simple(out, "MOST SKIPPED TRACKS")?;
    write_ranking(out, &analytics::most_skipped_track(events), limit, plays)?;

    write_section_simple(out, "NOPE (skipped within 30 seconds)")?;
    write_ranking(out, &analytics::immediate_skips(events), limit, plays)?;

    write_section_simple(out, "INSTANT SKIPS (skipped within 1 second)")?;
    write_ranking(out, &analytics::instant_skips(events), limit, plays)?;

    write_section_simple(
        out,
        &format!("TRUE SKIP RATE (artists over {} plays)", analysis.skip_rate_min_plays),
    )?;
    write_ranking(
        out,
        &analytics::true_skip_rate(events, analysis.skip_rate_min_plays),
        limit,
        percent,
    )?;

    write_section_simple(out, "SKIPPER'S REMORSE (replayed but mostly skipped)")?;
    write_ranking(out, &analytics::skippers_remorse(events), limit, percent)?;

    write_section_simple(
        out,
        &format!("SKIPLESS ALBUMS (at least {} plays)", analysis.album_min_plays),
    )?;
    write_ranking(
        out,
        &analytics::skipless_albums(events, analysis.album_min_plays),
        limit,
        percent,
    )?;

    write_section_simple(out, "OBSESSION SCORE (plays per day played)")?;
    write_ranking(out, &analytics::obsession_score(events), limit, ratio)?;

    write_section_simple(out, "COMPLETIONIST SCORE (unique tracks per play)")?;
    write_ranking(
        out,
        &analytics::sampler_vs_completionist(events, analysis.artist_min_plays),
        limit,
        ratio,
    )?;

    write_section_simple(out, "VARIETY SCORE (unique artists per play)")?;
    for (year, score) in analytics::variety_score(events) {
        writeln!(out, "  {year}: {score:.3}")?;
    }

    write_section_simple(out, "THE SHUFFLE PARADOX")?;
    let shuffle = analytics::shuffle_paradox(events);
    writeln!(out, "  Skip rate with shuffle on:  {:.1}%", shuffle.shuffle_skip_rate)?;
    writeln!(out, "  Skip rate with shuffle off: {:.1}%", shuffle.normal_skip_rate)?;

    write_section_simple(out, "NATURAL CAUSES")?;
    let death = analytics::natural_death(events, analysis.artist_min_plays);
    writeln!(out, "  Finished naturally: {:.1}%", death.natural)?;
    writeln!(out, "  Cut short:          {:.1}%", death.killed)?;
    writeln!(out, "  Most respected artists:")?;
    write_ranking(out, &death.most_respected, limit, percent)?;

    write_section_simple(out, "CONTROL FREAK VS PASSENGER")?;
    let control = analytics::control_freak(events);
    writeln!(out, "  Active listening:  {:.1}%", control.active)?;
    writeln!(out, "  Passive listening: {:.1}%", control.passive)?;
    match control.most_clicked {
        Some((artist, starts)) => {
            writeln!(out, "  Most clicked artist: {artist} ({starts} active starts)")?;
        }
        None => writeln!(out, "  Most clicked artist: -")?,
    }
    writeln!(out, "  Active share per year:")?;
    for (year, share) in analytics::active_listening_trend(events) {
        writeln!(out, "    {year}: {share:.1}%")?;
    }

    write_section_simple(out, "THE COMFORT ZONE")?;
    let comfort = analytics::comfort_zone(events);
    writeln!(out, "  {:.1}% of listening time went to these artists:", comfort.share)?;
    write_ranking(out, &comfort.artists, limit, hours)?;

    write_section_simple(out, "ARTIST TRAITS")?;
    for traits in analytics::artist_traits(events, PROFILED_ARTISTS) {
        writeln!(
            out,
            "  {:<25} loyalty {:.2}  discovery {:.2}  night {:.2}  weekend {:.2}  active {:.2}",
            truncate(&traits.artist, 25),
            traits.loyalty,
            traits.discovery,
            traits.night_owl,
            traits.weekend_warrior,
            traits.active_choice
        )?;
    }
    Ok(())
}

fn write_streaks<W: Write>(
    out: &mut W,
    events: &[PlayEvent],
    limit: usize,
    analysis: &AnalysisConfig,
) -> io::Result<()> {
    write_section_simple(out, "STREAKS")?;

    match analytics::most_consecutive_plays(events) {
        Some((track, count)) => {
            writeln!(out, "  Most consecutive plays: {track} ({count} in a row)")?;
        }
        None => writeln!(out, "  Most consecutive plays: -")?,
    }

    let streak = analytics::longest_listening_streak(events, analysis.streak_gap_tolerance());
    writeln!(
        out,
        "  Longest listening streak: {} ({} to {})",
        format_span(streak.duration),
        stamp_or_dash(streak.start),
        stamp_or_dash(streak.end)
    )?;

    let unskipped = analytics::unskippable_streak(events);
    writeln!(
        out,
        "  Unskippable streak: {} plays ({} to {})",
        unskipped.plays,
        stamp_or_dash(unskipped.start),
        stamp_or_dash(unskipped.end)
    )?;

    match analytics::sound_of_silence(events) {
        Some(silence) => writeln!(
            out,
            "  Sound of silence: {} ({} to {})",
            format_span(silence.gap),
            stamp(silence.from),
            stamp(silence.to)
        )?,
        None => writeln!(out, "  Sound of silence: -")?,
    }

    match analytics::album_purist(events) {
        Some(run) => writeln!(
            out,
            "  Album purist: {} ({} tracks in a row)",
            run.album, run.tracks
        )?,
        None => writeln!(out, "  Album purist: -")?,
    }

    writeln!(
        out,
        "  Artist hopper score: {:.2} (low = shuffle lover, high = album listener)",
        analytics::artist_hopper(events)
    )?;

    write_section_simple(out, "ALBUM LOYALTY (3+ tracks in a row)")?;
    write_ranking(out, &analytics::album_loyalty(events), limit, |v| {
        format!("{v:4} runs")
    })
}

fn write_discovery<W: Write>(
    out: &mut W,
    events: &[PlayEvent],
    limit: usize,
    analysis: &AnalysisConfig,
) -> io::Result<()> {
    write_section_simple(out, "TOP ARTIST PER MONTH")?;
    for (month, (artist, count)) in analytics::top_artist_per_month(events) {
        writeln!(out, "  {month}: {artist} ({count} plays)")?;
    }

    write_section_simple(out, "QUARTERLY REVIEW")?;
    for (quarter, top) in analytics::quarterly_review(events).iter().enumerate() {
        match top {
            Some((track, count)) => writeln!(out, "  Q{}: {track} ({count} plays)", quarter + 1)?,
            None => writeln!(out, "  Q{}: -", quarter + 1)?,
        }
    }

    write_section_simple(out, "NEW ARTISTS PER MONTH")?;
    for (month, count) in analytics::discovery_rate(events) {
        writeln!(out, "  {month}: {count}")?;
    }
    match analytics::discovery_peak(events) {
        Some((month, count)) => writeln!(out, "  Discovery peak: {month} ({count} new artists)")?,
        None => writeln!(out, "  Discovery peak: -")?,
    }

    write_section_simple(
        out,
        &format!("LISTENING VELOCITY (days to {} plays)", analysis.velocity_target_plays),
    )?;
    write_ranking(
        out,
        &analytics::listening_velocity(events, analysis.velocity_target_plays),
        limit,
        days,
    )?;

    write_section_simple(
        out,
        &format!("THE COMEBACK (gaps over {} days)", analysis.comeback_gap_days),
    )?;
    write_ranking(
        out,
        &analytics::the_comeback(events, analysis.comeback_gap_days),
        limit,
        days,
    )?;

    write_section_simple(
        out,
        &format!("FORGOTTEN FAVORITES (silent for {} months)", analysis.forgotten_months),
    )?;
    write_ranking(
        out,
        &analytics::forgotten_favorites(events, analysis.forgotten_months),
        limit,
        |v| format!("{v:4} past plays"),
    )?;

    write_section_simple(out, "ONE WEEK WONDERS")?;
    let wonders = analytics::one_week_wonders(events);
    if wonders.is_empty() {
        writeln!(out, "  -")?;
    }
    for (i, wonder) in wonders.iter().take(limit).enumerate() {
        writeln!(
            out,
            "  #{:2} - {} in {} : {}",
            i + 1,
            wonder.plays,
            wonder.week,
            wonder.artist
        )?;
    }

    write_section_simple(out, "NEW YEAR'S TRANSITIONS")?;
    for (year, transition) in analytics::new_years_transitions(events) {
        writeln!(out, "  {year} -> {}:", year + 1)?;
        writeln!(out, "    Last:  {}", transition.last_of_year.track_key())?;
        writeln!(out, "    First: {}", transition.first_of_next.track_key())?;
    }

    write_section_simple(out, "TOP ARTISTS OVER THE YEARS")?;
    let top: Vec<String> = analytics::play_counts_by_artist(events)
        .into_iter()
        .take(PROFILED_ARTISTS)
        .map(|(artist, _)| artist)
        .collect();
    for (artist, years) in analytics::artist_history_over_time(events, &top) {
        let per_year: Vec<String> = years
            .iter()
            .map(|(year, count)| format!("{year}: {count}"))
            .collect();
        writeln!(out, "  {}: {}", truncate(&artist, 25), per_year.join(", "))?;
    }
    Ok(())
}

fn write_sessions<W: Write>(
    out: &mut W,
    events: &[PlayEvent],
    limit: usize,
    analysis: &AnalysisConfig,
) -> io::Result<()> {
    write_section_simple(out, "SESSIONS")?;
    let stats = analytics::session_analysis(events, analysis.stats_session_gap());
    writeln!(
        out,
        "  {} sessions, {:.1} minutes and {:.1} tracks on average",
        stats.sessions, stats.avg_minutes, stats.avg_tracks
    )?;
    writeln!(
        out,
        "  Quick fixes (single-track sessions): {}",
        analytics::quick_fix(events, analysis.session_gap())
    )?;

    write_section_simple(out, "SESSION STARTERS")?;
    write_ranking(
        out,
        &analytics::session_starter(events, analysis.session_gap()),
        limit,
        plays,
    )?;

    write_section_simple(out, "SESSION CLOSERS")?;
    write_ranking(
        out,
        &analytics::session_closer(events, analysis.session_gap()),
        limit,
        plays,
    )
}

fn write_names<W: Write>(out: &mut W, events: &[PlayEvent], limit: usize) -> io::Result<()> {
    write_section_simple(out, "COLLABORATIONS")?;
    write_ranking(out, &analytics::collaborator(events), limit, plays)?;

    write_section_simple(out, "NAMES")?;
    let remix = analytics::remix_junkie(events);
    writeln!(out, "  Remix junkie: {:.1}% ({} plays)", remix.percent, remix.plays)?;
    let live = analytics::live_fanatic(events);
    writeln!(out, "  Live fanatic: {:.1}% ({} plays)", live.percent, live.plays)?;

    let longest = analytics::spelling_bee(events);
    writeln!(
        out,
        "  Longest artist name: {} ({} characters)",
        longest.artist,
        longest.artist_len()
    )?;
    writeln!(
        out,
        "  Longest track title: {} ({} characters)",
        longest.track,
        longest.track_len()
    )?;

    write_section_simple(out, "THE SAME NAME GAME (titles shared by several artists)")?;
    write_ranking(out, &analytics::same_name_game(events), limit, |v| {
        format!("{v:2} artists")
    })
}

/// Busiest cell of a week grid, earliest on ties.
fn peak_cell<T: PartialOrd + Copy + Default>(grid: &WeekGrid<T>) -> Option<(usize, usize, T)> {
    let mut peak: Option<(usize, usize, T)> = None;
    for (day, row) in grid.iter().enumerate() {
        for (hour, &value) in row.iter().enumerate() {
            if value > peak.map_or_else(T::default, |(_, _, v)| v) {
                peak = Some((day, hour, value));
            }
        }
    }
    peak
}

fn write_peak<W: Write, T: PartialOrd + Copy + Default>(
    out: &mut W,
    label: &str,
    grid: &WeekGrid<T>,
    value: impl Fn(T) -> String,
) -> io::Result<()> {
    match peak_cell(grid) {
        Some((day, hour, v)) => writeln!(
            out,
            "  {label}: {} {hour:02}:00 ({})",
            WEEKDAY_NAMES[day],
            value(v)
        ),
        None => writeln!(out, "  {label}: -"),
    }
}

fn write_charts<W: Write>(
    out: &mut W,
    events: &[PlayEvent],
    limit: usize,
    analysis: &AnalysisConfig,
) -> io::Result<()> {
    write_section_simple(out, "LISTENING BY HOUR")?;
    let hour_labels: Vec<String> = (0..24).map(|h| format!("{h:02}:00")).collect();
    write_histogram(out, &hour_labels, &analytics::listening_by_hour(events), HISTOGRAM_WIDTH)?;

    write_section_simple(out, "LISTENING BY DAY OF WEEK")?;
    write_histogram(
        out,
        &WEEKDAY_NAMES,
        &analytics::listening_by_day_of_week(events),
        HISTOGRAM_WIDTH,
    )?;

    write_section_simple(out, "SEASONS")?;
    let seasons = analytics::seasonal_listening(events);
    let season_labels = seasons.map(|(season, _)| season);
    let season_counts = seasons.map(|(_, count)| count);
    write_histogram(out, &season_labels, &season_counts, HISTOGRAM_WIDTH)?;

    let day_night = analytics::day_night_split(events);
    writeln!(out, "  Day plays: {}  Night plays: {}", day_night.day, day_night.night)?;

    write_section_simple(out, "WEEKLY RHYTHM")?;
    write_peak(out, "Busiest hour", &analytics::hourly_heatmap_data(events), |v| {
        format!("{v} plays")
    })?;
    write_peak(
        out,
        "Most hands-on hour",
        &analytics::active_listening_heatmap_data(events),
        |v| format!("{v} deliberate starts"),
    )?;
    write_peak(out, "Pickiest hour", &analytics::picky_grid_data(events), |v| {
        format!("{v:.1}% skipped")
    })?;

    write_section_simple(out, "CALENDAR")?;
    let calendar = analytics::calendar_heatmap_data(events);
    writeln!(out, "  {:<6}{}", "", MONTH_NAMES.map(|m| format!("{m:>6}")).concat())?;
    for (year, counts) in calendar.years.iter().zip(&calendar.counts) {
        let row: String = counts.iter().map(|c| format!("{c:>6}")).collect();
        writeln!(out, "  {year:<6}{row}")?;
    }

    write_section_simple(out, "DEVICE HABITS (peak hour per platform)")?;
    let habits = analytics::device_habits_data(events);
    for (platform, counts) in habits.platforms.iter().zip(&habits.counts) {
        let total: u64 = counts.iter().sum();
        let peak = counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (hour, &c)| if c > best.1 { (hour, c) } else { best });
        writeln!(
            out,
            "  {:<30} {:>6} plays, mostly at {:02}:00",
            truncate(platform, 30),
            total,
            peak.0
        )?;
    }

    write_section_simple(out, "ARTIST ERAS (peak month per artist)")?;
    let eras = analytics::artist_eras_data(events, analysis.artist_eras_top_n, analysis.normalize_eras);
    for (artist, row) in eras.artists.iter().zip(&eras.values).take(limit) {
        let peak = row
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
                Some((_, b)) if v <= b => best,
                _ => Some((i, v)),
            });
        let month = peak
            .and_then(|(i, _)| eras.months.get(i))
            .map_or("-", String::as_str);
        writeln!(out, "  {:<30} {}", truncate(artist, 30), month)?;
    }
    Ok(())
}
