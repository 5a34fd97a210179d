//! Timeline data model: `Clip`, `Track`, `Gap`, and the `TimelineState`
//! aggregate snapshot.
//!
//! `TimelineState` is treated as an immutable value by the engine facade:
//! every edit clones the current snapshot, applies the mutation primitives
//! below, and commits the result. The primitives themselves perform no
//! invariant checking — they only keep the clip index and the per-track
//! ordered lists consistent with each other.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tc_common::{ClipId, MediaKind, SourceRef, TimeMs, TrackId};

use crate::zones::ZoneRegistry;

/// A placed media segment occupying the half-open interval
/// `[start, start + duration)` on exactly one track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    /// Unique clip identifier.
    pub id: ClipId,
    /// Track currently owning this clip.
    pub track_id: TrackId,
    /// Timeline position of the clip's left edge. Never negative.
    pub start: TimeMs,
    /// Clip length. Always positive.
    pub duration: TimeMs,
    /// Opaque reference to the media content; resolved by the export pipeline.
    pub source: SourceRef,
}

impl Clip {
    pub fn new(
        id: impl Into<String>,
        track_id: impl Into<String>,
        start: TimeMs,
        duration: TimeMs,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: ClipId::new(id),
            track_id: TrackId::new(track_id),
            start,
            duration,
            source: SourceRef::new(source),
        }
    }

    /// Exclusive right edge of the clip.
    pub fn end(&self) -> TimeMs {
        self.start + self.duration
    }

    /// Half-open interval overlap test against another clip.
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

/// An ordered lane holding mutually non-overlapping clips of one media kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier.
    pub id: TrackId,
    /// Kind of media this track holds.
    pub kind: MediaKind,
    /// Clip ids, kept sorted ascending by clip start time.
    pub clip_ids: Vec<ClipId>,
}

/// An empty stretch between two adjacent clips on a track.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub track_id: TrackId,
    pub start: TimeMs,
    pub end: TimeMs,
}

impl Gap {
    pub fn duration(&self) -> TimeMs {
        self.end - self.start
    }
}

/// Aggregate snapshot of the whole timeline: all tracks, the clip index,
/// all magnetic zones, and the derived total duration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    /// All tracks in layout order.
    pub tracks: Vec<Track>,
    /// Clip index: id → clip. Kept in lockstep with the tracks' id lists.
    pub clips: HashMap<ClipId, Clip>,
    /// Magnetic zone registry (beats and manual markers).
    pub zones: ZoneRegistry,
    /// Max over all clips of `start + duration`, or 0 when empty.
    pub duration: TimeMs,
}

impl TimelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty track.
    pub fn add_track(&mut self, id: TrackId, kind: MediaKind) {
        tracing::debug!(track_id = %id, ?kind, "Adding track");
        self.tracks.push(Track {
            id,
            kind,
            clip_ids: Vec::new(),
        });
    }

    pub fn track(&self, track_id: &TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| &t.id == track_id)
    }

    fn track_mut(&mut self, track_id: &TrackId) -> Option<&mut Track> {
        self.tracks.iter_mut().find(|t| &t.id == track_id)
    }

    pub fn clip(&self, clip_id: &ClipId) -> Option<&Clip> {
        self.clips.get(clip_id)
    }

    pub fn clip_mut(&mut self, clip_id: &ClipId) -> Option<&mut Clip> {
        self.clips.get_mut(clip_id)
    }

    /// Iterate over every clip on every track, in no particular order.
    pub fn all_clips(&self) -> impl Iterator<Item = &Clip> {
        self.clips.values()
    }

    pub fn total_clips(&self) -> usize {
        self.clips.len()
    }

    /// Clips on a track, sorted ascending by start time.
    pub fn clips_on_track(&self, track_id: &TrackId) -> Vec<&Clip> {
        let Some(track) = self.track(track_id) else {
            return Vec::new();
        };
        let mut clips: Vec<&Clip> = track
            .clip_ids
            .iter()
            .filter_map(|id| self.clips.get(id))
            .collect();
        clips.sort_by(|a, b| a.start.total_cmp(&b.start));
        clips
    }

    /// Half-open interval overlap test between two clips by id.
    /// Clips on different tracks never overlap.
    pub fn overlaps(&self, a: &ClipId, b: &ClipId) -> bool {
        match (self.clips.get(a), self.clips.get(b)) {
            (Some(a), Some(b)) => a.track_id == b.track_id && a.overlaps(b),
            _ => false,
        }
    }

    /// Max clip end across all tracks, or zero when the timeline is empty.
    pub fn total_duration(&self) -> TimeMs {
        self.clips
            .values()
            .map(Clip::end)
            .fold(TimeMs::ZERO, TimeMs::max)
    }

    /// Refresh the cached `duration` field from the clip index.
    pub fn recalculate_duration(&mut self) {
        self.duration = self.total_duration();
    }

    // --- Mutation primitives (no validation) ---

    /// Insert a clip into the index and its track's ordered list.
    pub fn insert_clip(&mut self, clip: Clip) {
        let track_id = clip.track_id.clone();
        let clip_id = clip.id.clone();
        self.clips.insert(clip_id.clone(), clip);
        if let Some(track) = self.track_mut(&track_id) {
            track.clip_ids.push(clip_id);
        }
        self.sort_track(&track_id);
    }

    /// Remove a clip from the index and its track's list.
    pub fn remove_clip(&mut self, clip_id: &ClipId) -> Option<Clip> {
        let clip = self.clips.remove(clip_id)?;
        if let Some(track) = self.track_mut(&clip.track_id) {
            track.clip_ids.retain(|id| id != clip_id);
        }
        Some(clip)
    }

    /// Move a clip to a new start position, transferring track ownership
    /// atomically (detach + reattach) when the target track differs.
    pub fn relocate_clip(&mut self, clip_id: &ClipId, track_id: &TrackId, start: TimeMs) {
        let Some(clip) = self.clips.get_mut(clip_id) else {
            return;
        };
        let old_track = clip.track_id.clone();
        clip.start = start;
        clip.track_id = track_id.clone();

        if &old_track != track_id {
            if let Some(track) = self.track_mut(&old_track) {
                track.clip_ids.retain(|id| id != clip_id);
            }
            if let Some(track) = self.track_mut(track_id) {
                track.clip_ids.push(clip_id.clone());
            }
            self.sort_track(&old_track);
        }
        self.sort_track(track_id);
    }

    /// Re-sort a track's id list ascending by clip start.
    pub fn sort_track(&mut self, track_id: &TrackId) {
        // Collect starts first; the id list borrows the track while the
        // lookup needs the clip index.
        let starts: HashMap<ClipId, TimeMs> = match self.track(track_id) {
            Some(track) => track
                .clip_ids
                .iter()
                .filter_map(|id| self.clips.get(id).map(|c| (id.clone(), c.start)))
                .collect(),
            None => return,
        };
        if let Some(track) = self.track_mut(track_id) {
            track.clip_ids.sort_by(|a, b| {
                let sa = starts.get(a).copied().unwrap_or(TimeMs::ZERO);
                let sb = starts.get(b).copied().unwrap_or(TimeMs::ZERO);
                sa.total_cmp(&sb)
            });
        }
    }

    // --- Derived queries ---

    /// Empty stretches between adjacent clips on one track.
    pub fn gaps_on_track(&self, track_id: &TrackId) -> Vec<Gap> {
        let clips = self.clips_on_track(track_id);
        let mut gaps = Vec::new();
        for pair in clips.windows(2) {
            let prev_end = pair[0].end();
            if pair[1].start > prev_end {
                gaps.push(Gap {
                    track_id: track_id.clone(),
                    start: prev_end,
                    end: pair[1].start,
                });
            }
        }
        gaps
    }

    /// All gaps across all tracks, in track layout order.
    pub fn gaps(&self) -> Vec<Gap> {
        self.tracks
            .iter()
            .flat_map(|t| self.gaps_on_track(&t.id))
            .collect()
    }

    /// Every attraction point currently on the timeline: all clip edges
    /// plus all magnetic zone positions, sorted ascending. For display;
    /// snapping works from the live candidate set in [`crate::snap`].
    pub fn snap_points(&self) -> Vec<TimeMs> {
        let mut points: Vec<TimeMs> = Vec::with_capacity(self.clips.len() * 2);
        for clip in self.clips.values() {
            points.push(clip.start);
            points.push(clip.end());
        }
        for zone in self.zones.all() {
            points.push(zone.position);
        }
        points.sort_by(TimeMs::total_cmp);
        points
    }
}
