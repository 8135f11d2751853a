//! Domain-specific newtypes for type safety.
//!
//! Play durations get their own wrapper so they cannot be mixed up with
//! counts, and tracks/albums are identified by composite keys that always
//! carry the artist. Uses `derive_more` to eliminate arithmetic and
//! formatting boilerplate.

use std::fmt;
use std::iter::Sum;
use std::ops::{AddAssign, Sub};

use chrono::Duration;
use derive_more::{Add as DeriveAdd, Display, From, Into};
use serde::{Deserialize, Serialize};

// ============================================================================
// Milliseconds
// ============================================================================

/// A duration in milliseconds.
///
/// Used for `ms_played` on every play event and for accumulated listening
/// time in the duration rankings.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    DeriveAdd,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Milliseconds(pub i64);

impl Milliseconds {
    /// Create a new instance.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the inner value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Check if the value is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Create from seconds.
    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Self(secs * 1000)
    }

    /// Create from minutes.
    #[must_use]
    pub const fn from_mins(mins: i64) -> Self {
        Self(mins * 60 * 1000)
    }

    /// Convert to a calendar-arithmetic duration.
    #[must_use]
    pub fn to_duration(self) -> Duration {
        Duration::milliseconds(self.0)
    }
}

impl Sub for Milliseconds {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl AddAssign for Milliseconds {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Milliseconds {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, ms| acc + ms)
    }
}

impl From<Duration> for Milliseconds {
    fn from(value: Duration) -> Self {
        Self(value.num_milliseconds())
    }
}

impl fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total_seconds = self.0 / 1000;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        match (hours, minutes) {
            (0, 0) => write!(f, "{seconds}s"),
            (0, _) => write!(f, "{minutes}m {seconds}s"),
            _ => write!(f, "{hours}h {minutes}m {seconds}s"),
        }
    }
}

// ============================================================================
// Composite keys
// ============================================================================

/// Identity of a track: the same title by two artists is two tracks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[display("{artist} - {track}")]
pub struct TrackKey {
    pub artist: String,
    pub track: String,
}

impl TrackKey {
    #[must_use]
    pub fn new(artist: impl Into<String>, track: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            track: track.into(),
        }
    }
}

/// Identity of an album: the album title qualified by its artist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
#[display("{artist} - {album}")]
pub struct AlbumKey {
    pub artist: String,
    pub album: String,
}

impl AlbumKey {
    #[must_use]
    pub fn new(artist: impl Into<String>, album: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
