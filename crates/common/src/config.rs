//! Configuration structs for timeline editing and beat detection.

use serde::{Deserialize, Serialize};

use crate::types::TimeMs;

/// Behavior switches and thresholds for the timeline engine.
///
/// Defaults match the editor panel's slider ranges: snap threshold
/// 10–200 ms, ripple delay 0–500 ms, gap-close limit around a second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Maximum distance within which a proposed position is replaced by
    /// the nearest attraction candidate.
    pub snap_threshold: TimeMs,
    /// Fixed right-shift quantum applied to trailing clips when a move
    /// introduces an overlap.
    pub ripple_delay: TimeMs,
    /// Gaps strictly smaller than this are closed automatically; larger
    /// gaps are treated as intentional silence.
    pub gap_close_max: TimeMs,
    /// Propagate shifts to trailing clips after every edit.
    pub auto_ripple: bool,
    /// Run the gap closer after every edit.
    pub gap_closing: bool,
    /// Include magnetic zones (beats, markers) in the snap candidate set.
    pub snap_to_beat: bool,
    /// Apply ripple across all tracks instead of only the edited track.
    /// Off by default: cross-track ripple is only wanted when tracks are
    /// cut to a common rhythm.
    pub cross_track_ripple: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: TimeMs(100.0),
            ripple_delay: TimeMs(100.0),
            gap_close_max: TimeMs(1000.0),
            auto_ripple: true,
            gap_closing: true,
            snap_to_beat: false,
            cross_track_ripple: false,
        }
    }
}

/// Tuning parameters for the energy-envelope beat detector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BeatDetectorConfig {
    /// How far above the local mean (in local std-devs) a frame's energy
    /// must rise to count as an onset candidate.
    pub sensitivity: f64,
    /// Candidates below this confidence are discarded.
    pub min_confidence: f32,
    /// Lower bound on the implied tempo between consecutive beats.
    pub min_bpm: f64,
    /// Upper bound on the implied tempo between consecutive beats.
    pub max_bpm: f64,
}

impl Default for BeatDetectorConfig {
    fn default() -> Self {
        Self {
            sensitivity: 0.6,
            min_confidence: 0.4,
            min_bpm: 60.0,
            max_bpm: 180.0,
        }
    }
}
