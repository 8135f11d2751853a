//! # Listen Stats
//!
//! Listening statistics for streaming-history exports.
//!
//! This crate provides:
//! - A loader for extended streaming-history exports
//! - The play event model and a session segmenter
//! - A library of aggregations over plays (top lists, habits, streaks,
//!   discovery, sessions and per-track summaries)
//! - A text report and a CSV export built on top of them

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod analytics;
pub mod config;
pub mod date_range;
pub mod display;
pub mod error;
pub mod event;
pub mod export;
pub mod loader;
pub mod report;
pub mod session;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use date_range::DateRange;
pub use error::{Error, Result};
pub use event::PlayEvent;
pub use session::{segment, Session};
pub use types::{AlbumKey, Milliseconds, TrackKey};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "listen-stats";
