//! Configuration management for listen-stats

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use chrono::Duration;

use crate::error::{Error, Result};
use crate::session::{DEFAULT_SESSION_GAP_MINUTES, STATS_SESSION_GAP_MINUTES};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Where the export lives
    pub history: HistoryConfig,

    /// Thresholds used by the aggregations
    pub analysis: AnalysisConfig,

    /// Report output
    pub report: ReportConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Base directory for relative history and output paths
    pub data_dir: Option<PathBuf>,
}

/// Streaming-history export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Directory holding the extracted `Streaming_History*.json` files
    pub dir: PathBuf,
}

/// Analysis thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Gap that splits sessions for starters, closers and quick fixes
    pub session_gap_minutes: i64,

    /// Gap that splits sessions for the average-session summary
    pub stats_session_gap_minutes: i64,

    /// Largest pause still counted as one listening streak
    pub streak_gap_tolerance_minutes: i64,

    /// Plays an artist needs to reach in the velocity ranking
    pub velocity_target_plays: usize,

    /// Days of absence before a return counts as a comeback
    pub comeback_gap_days: i64,

    /// Months without plays before a favorite counts as forgotten
    pub forgotten_months: i64,

    /// Artists shown in the eras chart data
    pub artist_eras_top_n: usize,

    /// Divide each artist's eras row by that artist's busiest month
    pub normalize_eras: bool,

    /// Plays an artist needs before its skip rate is ranked
    pub skip_rate_min_plays: u64,

    /// Plays an album needs before it is ranked
    pub album_min_plays: u64,

    /// Plays an artist needs for the completion and catalogue ratios
    pub artist_min_plays: u64,

    /// Plays a one-hit wonder needs
    pub one_hit_min_plays: u64,
}

/// Report output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of entries printed per ranking
    pub limit: usize,

    /// Destination of the per-track CSV export
    pub csv_path: PathBuf,

    /// Optional file the report text is also written to
    pub output: Option<PathBuf>,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            data_dir: None,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("Spotify Extended Streaming History"),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            session_gap_minutes: DEFAULT_SESSION_GAP_MINUTES,
            stats_session_gap_minutes: STATS_SESSION_GAP_MINUTES,
            streak_gap_tolerance_minutes: 10,
            velocity_target_plays: 100,
            comeback_gap_days: 365,
            forgotten_months: 6,
            artist_eras_top_n: 20,
            normalize_eras: true,
            skip_rate_min_plays: 20,
            album_min_plays: 50,
            artist_min_plays: 50,
            one_hit_min_plays: 5,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            csv_path: PathBuf::from("song_stats.csv"),
            output: None,
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn session_gap(&self) -> Duration {
        Duration::minutes(self.session_gap_minutes)
    }

    #[must_use]
    pub fn stats_session_gap(&self) -> Duration {
        Duration::minutes(self.stats_session_gap_minutes)
    }

    #[must_use]
    pub fn streak_gap_tolerance(&self) -> Duration {
        Duration::minutes(self.streak_gap_tolerance_minutes)
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join(crate::APP_NAME).join("config.toml"))
    }

    /// Resolve `path` against `general.data_dir` when it is relative.
    #[must_use]
    pub fn resolve(&self, path: &Path) -> PathBuf {
        match self.general.data_dir {
            Some(ref base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// The export directory to load.
    #[must_use]
    pub fn history_dir(&self) -> PathBuf {
        self.resolve(&self.history.dir)
    }

    /// Validate configuration values.
    ///
    /// Call this after loading to ensure all values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        // Validate log_level is a known level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        let gaps = [
            ("session_gap_minutes", self.analysis.session_gap_minutes),
            ("stats_session_gap_minutes", self.analysis.stats_session_gap_minutes),
            ("streak_gap_tolerance_minutes", self.analysis.streak_gap_tolerance_minutes),
            ("comeback_gap_days", self.analysis.comeback_gap_days),
            ("forgotten_months", self.analysis.forgotten_months),
        ];
        for (name, value) in gaps {
            if value <= 0 {
                return Err(Error::config(format!("{name} must be positive, got {value}")));
            }
        }

        if self.report.limit == 0 {
            return Err(Error::config("report limit must be at least 1"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.analysis.session_gap(), Duration::minutes(30));
        assert_eq!(config.analysis.stats_session_gap(), Duration::minutes(20));
        assert_eq!(config.report.limit, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [analysis]
            session_gap_minutes = 45

            [report]
            limit = 25
            "#,
        )
        .expect("parse");
        assert_eq!(config.analysis.session_gap_minutes, 45);
        assert_eq!(config.analysis.album_min_plays, 50);
        assert_eq!(config.report.limit, 25);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.general.log_level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.session_gap_minutes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.report.limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.history.dir = PathBuf::from("/data/export");
        config.report.output = Some(PathBuf::from("report.txt"));
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.history.dir, PathBuf::from("/data/export"));
        assert_eq!(loaded.report.output, Some(PathBuf::from("report.txt")));
    }

    #[test]
    fn test_resolve_against_data_dir() {
        let mut config = Config::default();
        assert_eq!(
            config.history_dir(),
            PathBuf::from("Spotify Extended Streaming History")
        );

        config.general.data_dir = Some(PathBuf::from("/home/me/music"));
        assert_eq!(
            config.history_dir(),
            PathBuf::from("/home/me/music/Spotify Extended Streaming History")
        );
        assert_eq!(
            config.resolve(Path::new("/tmp/out.csv")),
            PathBuf::from("/tmp/out.csv")
        );
    }
}
