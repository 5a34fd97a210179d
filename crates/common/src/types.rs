//! Core types with newtype pattern for type safety.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

/// Timeline position or duration in milliseconds (f64 precision).
///
/// Clip timing must survive hand-off to the export pipeline with
/// sub-second resolution, so all positions are kept as fractional
/// milliseconds rather than frame counts.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TimeMs(pub f64);

impl TimeMs {
    pub const ZERO: Self = Self(0.0);

    pub fn from_ms(ms: f64) -> Self {
        Self(ms)
    }

    pub fn from_secs(secs: f64) -> Self {
        Self(secs * 1000.0)
    }

    pub fn as_ms(self) -> f64 {
        self.0
    }

    pub fn as_secs(self) -> f64 {
        self.0 / 1000.0
    }

    /// Absolute distance to another position.
    pub fn distance(self, other: Self) -> Self {
        Self((self.0 - other.0).abs())
    }

    /// Total ordering suitable for sorting clip lists (delegates to
    /// `f64::total_cmp`; NaN never occurs in validated state).
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }

    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

impl Add for TimeMs {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeMs {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeMs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // mm:ss.cc, matching the transport readout in the editor UI
        let total_ms = self.0.max(0.0);
        let mins = (total_ms / 60_000.0) as u32;
        let secs = ((total_ms % 60_000.0) / 1000.0) as u32;
        let centis = ((total_ms % 1000.0) / 10.0) as u32;
        write!(f, "{mins:02}:{secs:02}.{centis:02}")
    }
}

/// Unique identifier of a clip on the timeline.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a track.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier of a magnetic zone. Allocated monotonically by the
/// zone registry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u64);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Z{}", self.0)
    }
}

/// Opaque reference to the media content a clip plays. The engine never
/// inspects it; the export pipeline resolves it against the media library.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef(pub String);

impl SourceRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of media a track holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// Loudness band of a detected beat.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BeatIntensity {
    Low,
    Medium,
    High,
}

/// A detected rhythmic onset in the associated audio signal.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Beat {
    /// Timeline position of the onset.
    pub time: TimeMs,
    /// Detector confidence in [0.0, 1.0].
    pub confidence: f32,
    /// Loudness classification around the onset.
    pub intensity: BeatIntensity,
}
