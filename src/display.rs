//! Display utilities for formatting statistics output.
//!
//! This module provides shared formatting functions used by the report for
//! displaying listening statistics in the terminal. Everything writes to a
//! caller-provided [`io::Write`] so the same text can go to stdout, a file,
//! or both.
//!
//! # Functions
//!
//! - [`truncate`] - Truncate strings to a maximum length with ellipsis
//! - [`make_bar`] - Create visual bar charts for relative values
//! - [`format_hours_minutes`] / [`format_span`] - Human readable durations
//! - [`write_section`] / [`write_section_simple`] - Section headers
//! - [`write_ranking`] / [`write_histogram`] - Ranked lists and bar charts

use std::fmt::Display;
use std::io::{self, Write};

use chrono::Duration;

use crate::types::Milliseconds;

/// Width of the banner and section rules.
pub const RULE_WIDTH: usize = 50;

/// Longest key printed in a ranked list before truncation.
const KEY_WIDTH: usize = 70;

/// Truncate a string to a maximum length, adding "..." if truncated.
///
/// Counts characters rather than bytes, so multi-byte text is never split.
/// For `max_len < 3`, truncates without ellipsis since there's no room for "...".
///
/// # Examples
///
/// ```
/// use listen_stats::display::truncate;
///
/// assert_eq!(truncate("hello", 10), "hello");
/// assert_eq!(truncate("hello world", 8), "hello...");
/// assert_eq!(truncate("hello", 2), "he");
/// ```
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count <= max_len {
        s.to_string()
    } else if max_len < 3 {
        // No room for ellipsis, just truncate
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{truncated}...")
    }
}

/// Create a visual bar for displaying relative values.
///
/// Uses Unicode block characters to create a proportional bar chart.
///
/// # Arguments
///
/// * `value` - The value to represent
/// * `max_value` - The maximum value (determines 100% width)
/// * `width` - The total width of the bar in characters
#[must_use]
pub fn make_bar(value: u64, max_value: u64, width: usize) -> String {
    if max_value == 0 || value == 0 {
        return " ".repeat(width);
    }
    let ratio = (value as f64 / max_value as f64).clamp(0.0, 1.0);
    let filled = (ratio * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Format a play duration as `"{h}h {m}m"`.
#[must_use]
pub fn format_hours_minutes(ms: Milliseconds) -> String {
    let minutes = ms.get() / 60_000;
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Format a span of time for humans, e.g. `"3days 4h 12m"`.
///
/// Negative spans print as zero. Seconds are dropped.
#[must_use]
pub fn format_span(span: Duration) -> String {
    let whole_minutes = Duration::minutes(span.num_minutes());
    let std = whole_minutes.to_std().unwrap_or_default();
    humantime::format_duration(std).to_string()
}

/// Write a banner-style section header with equals signs.
pub fn write_section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "\n{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out, "  {title}")?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}

/// Write a simple section header with dashes.
pub fn write_section_simple<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out, "\n{title}")?;
    writeln!(out, "{}", "-".repeat(30))
}

/// Write up to `limit` ranked entries as `#NN - value : key`.
///
/// `value` renders each entry's value column. An empty list prints a dash
/// so the section never looks truncated.
pub fn write_ranking<W, K, V, F>(out: &mut W, entries: &[(K, V)], limit: usize, value: F) -> io::Result<()>
where
    W: Write,
    K: Display,
    F: Fn(&V) -> String,
{
    if entries.is_empty() {
        return writeln!(out, "  -");
    }
    for (i, (key, v)) in entries.iter().take(limit).enumerate() {
        writeln!(
            out,
            "  #{:2} - {} : {}",
            i + 1,
            value(v),
            truncate(&key.to_string(), KEY_WIDTH)
        )?;
    }
    Ok(())
}

/// Write one bar per label, scaled to the largest value.
pub fn write_histogram<W, L>(out: &mut W, labels: &[L], values: &[u64], width: usize) -> io::Result<()>
where
    W: Write,
    L: Display,
{
    let max_value = values.iter().copied().max().unwrap_or(0);
    for (label, &value) in labels.iter().zip(values) {
        writeln!(
            out,
            "  {:<10} {} {:>6}",
            label.to_string(),
            make_bar(value, max_value, width),
            value
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).expect("write to vec");
        String::from_utf8(out).expect("utf8")
    }

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_long_string() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_unicode() {
        assert_eq!(truncate("日本語テスト", 5), "日本...");
    }

    #[test]
    fn test_truncate_small_max_len() {
        // Edge cases: max_len < 3 means no room for ellipsis
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("hello", 1), "h");
        assert_eq!(truncate("hello", 0), "");
    }

    #[test]
    fn test_make_bar_full() {
        assert_eq!(make_bar(100, 100, 10), "██████████");
    }

    #[test]
    fn test_make_bar_half() {
        assert_eq!(make_bar(50, 100, 10), "█████░░░░░");
    }

    #[test]
    fn test_make_bar_zero_max() {
        assert_eq!(make_bar(50, 0, 10), "          ");
    }

    #[test]
    fn test_format_hours_minutes() {
        assert_eq!(format_hours_minutes(Milliseconds::from_mins(135)), "2h 15m");
        assert_eq!(format_hours_minutes(Milliseconds::new(59_999)), "0h 0m");
    }

    #[test]
    fn test_format_span() {
        assert_eq!(format_span(Duration::minutes(90)), "1h 30m");
        assert_eq!(format_span(Duration::days(3) + Duration::seconds(20)), "3days");
        assert_eq!(format_span(Duration::minutes(-5)), "0s");
    }

    #[test]
    fn test_write_ranking_limits_and_numbers() {
        let entries = vec![("alpha", 12_u64), ("beta", 7), ("gamma", 1)];
        let text = render(|out| write_ranking(out, &entries, 2, |v| format!("{v:4}")));
        assert_eq!(text, "  # 1 -   12 : alpha\n  # 2 -    7 : beta\n");
    }

    #[test]
    fn test_write_ranking_empty() {
        let entries: Vec<(String, u64)> = Vec::new();
        let text = render(|out| write_ranking(out, &entries, 5, u64::to_string));
        assert_eq!(text, "  -\n");
    }

    #[test]
    fn test_write_histogram_scales_to_max() {
        let text = render(|out| write_histogram(out, &["Mon", "Tue"], &[10, 5], 4));
        assert_eq!(text, "  Mon        ████     10\n  Tue        ██░░      5\n");
    }
}
