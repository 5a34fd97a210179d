//! Magnetic zone registry: labeled attraction points on the timeline.
//!
//! Zones come from two places: a completed beat-detection run (bulk
//! import, one zone per retained beat) or a manual marker action. A zone
//! is either scoped to a single track or global. Nearby zones are never
//! merged — callers control density.

use serde::{Deserialize, Serialize};
use tc_common::{Beat, BeatIntensity, TimeMs, TrackId, ZoneId};

/// Where a magnetic zone came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneSource {
    /// Created by a beat-detection run.
    Beat,
    /// Placed manually by the user.
    Marker,
}

/// A labeled timeline position that attracts nearby clip edges during moves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MagneticZone {
    /// Registry-allocated identifier.
    pub id: ZoneId,
    /// Track scope; `None` means the zone attracts clips on every track.
    pub track_id: Option<TrackId>,
    /// Timeline position of the attraction point.
    pub position: TimeMs,
    /// Provenance tag.
    pub source: ZoneSource,
    /// Loudness band of the originating beat, if any.
    pub intensity: Option<BeatIntensity>,
    /// Detector confidence of the originating beat, if any.
    pub confidence: Option<f32>,
}

/// Owns all magnetic zones and allocates their identifiers.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneRegistry {
    zones: Vec<MagneticZone>,
    next_id: u64,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a zone with no beat metadata. Returns its new id.
    pub fn add(&mut self, track_id: Option<TrackId>, position: TimeMs, source: ZoneSource) -> ZoneId {
        self.add_with_metadata(track_id, position, source, None, None)
    }

    /// Add a zone carrying beat metadata. Returns its new id.
    pub fn add_with_metadata(
        &mut self,
        track_id: Option<TrackId>,
        position: TimeMs,
        source: ZoneSource,
        intensity: Option<BeatIntensity>,
        confidence: Option<f32>,
    ) -> ZoneId {
        let id = ZoneId(self.next_id);
        self.next_id += 1;
        tracing::debug!(zone_id = %id, position = %position, ?source, "Adding magnetic zone");
        self.zones.push(MagneticZone {
            id,
            track_id,
            position,
            source,
            intensity,
            confidence,
        });
        id
    }

    /// Remove a zone by id. Returns whether it existed.
    pub fn remove(&mut self, zone_id: ZoneId) -> bool {
        let before = self.zones.len();
        self.zones.retain(|z| z.id != zone_id);
        let removed = self.zones.len() != before;
        if removed {
            tracing::debug!(zone_id = %zone_id, "Removed magnetic zone");
        }
        removed
    }

    /// All zones, in insertion order.
    pub fn all(&self) -> &[MagneticZone] {
        &self.zones
    }

    /// Zones that attract clips on the given track: the track's own zones
    /// plus every global zone.
    pub fn for_track<'a>(&'a self, track_id: &'a TrackId) -> impl Iterator<Item = &'a MagneticZone> {
        self.zones
            .iter()
            .filter(move |z| z.track_id.is_none() || z.track_id.as_ref() == Some(track_id))
    }

    /// Create one zone per beat, tagged `ZoneSource::Beat`, carrying the
    /// beat's intensity and confidence. Returns the new ids.
    pub fn import_beats(&mut self, track_id: Option<TrackId>, beats: &[Beat]) -> Vec<ZoneId> {
        let ids: Vec<ZoneId> = beats
            .iter()
            .map(|beat| {
                self.add_with_metadata(
                    track_id.clone(),
                    beat.time,
                    ZoneSource::Beat,
                    Some(beat.intensity),
                    Some(beat.confidence),
                )
            })
            .collect();
        tracing::debug!(count = ids.len(), "Imported beats as magnetic zones");
        ids
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
