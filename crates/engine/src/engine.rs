//! The engine facade: orchestrated edits over immutable timeline snapshots.
//!
//! Every public edit follows the same shape: validate identifiers, push
//! the prior snapshot onto history, clone the state, apply the snap /
//! ripple / gap-close algorithms from `tc-timeline`, commit the result as
//! the new authoritative state, and emit events. Each engine instance
//! owns its state, config, history, and handler registry outright, so
//! independent sessions never share anything.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, info};

use tc_beat::{BeatDetector, BeatError, DetectionHandle, DetectionJob};
use tc_common::{
    Beat, BeatDetectorConfig, ClipId, EditError, EditResult, MediaKind, TimeMs, TimelineConfig,
    TrackId, ZoneId,
};
use tc_timeline::{
    close_gaps, resolve, ripple_conflicts, ripple_delete, Clip, Gap, SnapScope, TimelineState,
    ZoneSource,
};

use crate::events::{EngineEvent, EventBus, EventKind, HandlerId};
use crate::history::HistoryManager;

/// Undo entries kept per engine.
const HISTORY_DEPTH: usize = 50;

/// Orchestrates timeline edits, beat import, events, and history.
#[derive(Debug)]
pub struct Engine {
    state: TimelineState,
    config: TimelineConfig,
    detector_config: BeatDetectorConfig,
    events: EventBus,
    history: HistoryManager,
}

impl Engine {
    pub fn new(config: TimelineConfig) -> Self {
        Self::with_state(TimelineState::new(), config)
    }

    /// Start from an existing snapshot (loaded project, remote sync).
    pub fn with_state(state: TimelineState, config: TimelineConfig) -> Self {
        Self {
            state,
            config,
            detector_config: BeatDetectorConfig::default(),
            events: EventBus::new(),
            history: HistoryManager::new(HISTORY_DEPTH),
        }
    }

    // --- Event registration ---

    /// Register an event handler. Multiple handlers per kind all fire.
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&EngineEvent) + Send + 'static,
    {
        self.events.on(kind, handler)
    }

    /// Unregister a handler. Returns whether it was registered.
    pub fn off(&mut self, id: HandlerId) -> bool {
        self.events.off(id)
    }

    // --- Edits ---

    /// Append an empty track.
    pub fn add_track(&mut self, id: TrackId, kind: MediaKind) -> EditResult<TimelineState> {
        if self.state.track(&id).is_some() {
            return Err(EditError::DuplicateTrack(id));
        }

        self.history.push("Add track", self.state.clone());
        let mut next = self.state.clone();
        next.add_track(id, kind);
        self.state = next.clone();
        Ok(next)
    }

    /// Insert a new clip, routed through snap, ripple, and gap closing
    /// like any other placement.
    pub fn add_clip(&mut self, clip: Clip) -> EditResult<TimelineState> {
        if self.state.track(&clip.track_id).is_none() {
            return Err(EditError::TrackNotFound(clip.track_id));
        }
        if self.state.clip(&clip.id).is_some() {
            return Err(EditError::DuplicateClip(clip.id));
        }

        self.history.push("Add clip", self.state.clone());
        let mut next = self.state.clone();

        let track_id = clip.track_id.clone();
        let scope = SnapScope {
            target_track: track_id.clone(),
            snap_to_beat: self.config.snap_to_beat,
        };
        let proposed = clip.start.max(TimeMs::ZERO);
        let position = resolve(
            proposed,
            &clip.id,
            &next,
            self.config.snap_threshold,
            &scope,
        );

        let clip_id = clip.id.clone();
        next.insert_clip(Clip {
            start: position,
            ..clip
        });

        let outcome = self.settle_track(&mut next, &track_id);
        next.recalculate_duration();

        // Ripple or gap closing may have moved the new clip off the
        // snapped position; report where it actually landed.
        let position = next.clip(&clip_id).map(|c| c.start).unwrap_or(position);
        self.state = next.clone();

        debug!(clip_id = %clip_id, track_id = %track_id, position = %position, "Clip added");
        self.emit_settle_events(outcome);
        self.events.emit(&EngineEvent::ClipAdded {
            clip_id,
            track_id,
            position,
        });
        Ok(next)
    }

    /// Move a clip to a new position, optionally onto another track.
    ///
    /// The target position is clamped at zero and resolved through the
    /// snap candidates before the clip is detached and reattached.
    pub fn move_clip(
        &mut self,
        clip_id: &ClipId,
        target: TimeMs,
        target_track: Option<TrackId>,
    ) -> EditResult<TimelineState> {
        let Some(clip) = self.state.clip(clip_id) else {
            return Err(EditError::ClipNotFound(clip_id.clone()));
        };
        let source_track = clip.track_id.clone();
        let track_id = target_track.unwrap_or_else(|| source_track.clone());
        if self.state.track(&track_id).is_none() {
            return Err(EditError::TrackNotFound(track_id));
        }

        self.history.push("Move clip", self.state.clone());
        let mut next = self.state.clone();

        let scope = SnapScope {
            target_track: track_id.clone(),
            snap_to_beat: self.config.snap_to_beat,
        };
        let proposed = target.max(TimeMs::ZERO);
        let position = resolve(proposed, clip_id, &next, self.config.snap_threshold, &scope);

        next.relocate_clip(clip_id, &track_id, position);

        let mut outcome = self.settle_track(&mut next, &track_id);
        if source_track != track_id && self.config.gap_closing {
            // The vacated track can only have gained a gap, never an overlap
            let moved = close_gaps(&mut next, &source_track, self.config.gap_close_max);
            outcome.gap_moved.extend(moved);
            outcome.collect_large_gaps(&next, &source_track, self.config.gap_close_max);
        }

        next.recalculate_duration();

        // Report where the clip settled, not just where it snapped.
        let position = next.clip(clip_id).map(|c| c.start).unwrap_or(position);
        self.state = next.clone();

        debug!(
            clip_id = %clip_id,
            track_id = %track_id,
            proposed = %proposed,
            position = %position,
            snapped = position != proposed,
            "Clip moved"
        );
        self.emit_settle_events(outcome);
        self.events.emit(&EngineEvent::ClipMoved {
            clip_id: clip_id.clone(),
            track_id,
            position,
        });
        Ok(next)
    }

    /// Delete a clip. With auto-ripple on, every downstream clip shifts
    /// left by the deleted clip's duration, unconditionally.
    pub fn delete_clip(&mut self, clip_id: &ClipId) -> EditResult<TimelineState> {
        if self.state.clip(clip_id).is_none() {
            return Err(EditError::ClipNotFound(clip_id.clone()));
        }

        self.history.push("Delete clip", self.state.clone());
        let mut next = self.state.clone();

        let Some(removed) = next.remove_clip(clip_id) else {
            return Err(EditError::ClipNotFound(clip_id.clone()));
        };
        let track_id = removed.track_id.clone();

        let mut shifted = Vec::new();
        if self.config.auto_ripple {
            if self.config.cross_track_ripple {
                let track_ids: Vec<TrackId> = next.tracks.iter().map(|t| t.id.clone()).collect();
                for id in &track_ids {
                    let mut moved = ripple_delete(&mut next, id, removed.start, removed.duration);
                    if *id != track_id {
                        // On a foreign track the zero clamp can stack
                        // clips at the origin; clear what it piled up.
                        for repaired in ripple_conflicts(&mut next, id, self.config.ripple_delay) {
                            if !moved.contains(&repaired) {
                                moved.push(repaired);
                            }
                        }
                    }
                    if !moved.is_empty() {
                        self.events.emit(&EngineEvent::RippleCompleted {
                            track_id: id.clone(),
                            affected: moved.clone(),
                        });
                        shifted.extend(moved);
                    }
                }
            } else {
                shifted = ripple_delete(&mut next, &track_id, removed.start, removed.duration);
                if !shifted.is_empty() {
                    self.events.emit(&EngineEvent::RippleCompleted {
                        track_id: track_id.clone(),
                        affected: shifted.clone(),
                    });
                }
            }
        }

        next.recalculate_duration();
        self.state = next.clone();

        info!(clip_id = %clip_id, track_id = %track_id, shifted = shifted.len(), "Clip deleted");
        self.events.emit(&EngineEvent::ClipDeleted {
            clip_id: clip_id.clone(),
            track_id,
            shifted,
        });
        Ok(next)
    }

    // --- Magnetic zones ---

    /// Place a manual or beat zone. `track` of `None` makes it global.
    pub fn add_magnetic_zone(
        &mut self,
        track: Option<TrackId>,
        position: TimeMs,
        source: ZoneSource,
    ) -> EditResult<ZoneId> {
        if let Some(track_id) = &track {
            if self.state.track(track_id).is_none() {
                return Err(EditError::TrackNotFound(track_id.clone()));
            }
        }

        self.history.push("Add zone", self.state.clone());
        let mut next = self.state.clone();
        let zone_id = next.zones.add(track, position, source);
        self.state = next;

        self.events.emit(&EngineEvent::ZonesChanged {
            zone_id,
            added: true,
        });
        Ok(zone_id)
    }

    pub fn remove_magnetic_zone(&mut self, zone_id: ZoneId) -> EditResult<TimelineState> {
        if !self.state.zones.all().iter().any(|z| z.id == zone_id) {
            return Err(EditError::ZoneNotFound(zone_id));
        }

        self.history.push("Remove zone", self.state.clone());
        let mut next = self.state.clone();
        next.zones.remove(zone_id);
        self.state = next.clone();

        self.events.emit(&EngineEvent::ZonesChanged {
            zone_id,
            added: false,
        });
        Ok(next)
    }

    /// Bulk-create one zone per beat as a single undo step. Returns the
    /// number of zones created.
    pub fn import_beats(&mut self, track: Option<TrackId>, beats: &[Beat]) -> usize {
        if beats.is_empty() {
            return 0;
        }

        self.history.push("Import beats", self.state.clone());
        let mut next = self.state.clone();
        let ids = next.zones.import_beats(track, beats);
        self.state = next;

        info!(count = ids.len(), "Beats imported as magnetic zones");
        ids.len()
    }

    // --- Beat detection workflow ---

    /// Kick off beat detection for `path` on a background thread.
    ///
    /// The job never touches engine state; feed its result back through
    /// [`finish_beat_detection`](Self::finish_beat_detection).
    pub fn start_beat_detection(&self, path: PathBuf) -> Result<DetectionHandle, BeatError> {
        DetectionJob::spawn(path, BeatDetector::new(self.detector_config.clone()))
    }

    /// Wait (bounded) for a detection job and import its beats as zones.
    ///
    /// Timeout, cancellation, and decode failure all import nothing;
    /// the timeline is only touched on successful completion.
    pub fn finish_beat_detection(
        &mut self,
        handle: DetectionHandle,
        timeout: Duration,
        track: Option<TrackId>,
    ) -> usize {
        let beats = handle.wait(timeout);
        self.import_beats(track, &beats)
    }

    // --- Configuration ---

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TimelineConfig) {
        self.config = config;
    }

    pub fn detector_config(&self) -> &BeatDetectorConfig {
        &self.detector_config
    }

    pub fn set_detector_config(&mut self, config: BeatDetectorConfig) {
        self.detector_config = config;
    }

    /// Flip auto-ripple; returns the new value.
    pub fn toggle_auto_ripple(&mut self) -> bool {
        self.config.auto_ripple = !self.config.auto_ripple;
        self.config.auto_ripple
    }

    /// Flip gap closing; returns the new value.
    pub fn toggle_gap_closing(&mut self) -> bool {
        self.config.gap_closing = !self.config.gap_closing;
        self.config.gap_closing
    }

    /// Flip beat snapping; returns the new value.
    pub fn toggle_snap_to_beat(&mut self) -> bool {
        self.config.snap_to_beat = !self.config.snap_to_beat;
        self.config.snap_to_beat
    }

    // --- Queries ---

    pub fn state(&self) -> &TimelineState {
        &self.state
    }

    /// Owned copy of the current snapshot, safe to hand to other threads.
    pub fn snapshot(&self) -> TimelineState {
        self.state.clone()
    }

    pub fn snap_points(&self) -> Vec<TimeMs> {
        self.state.snap_points()
    }

    pub fn gaps(&self) -> Vec<Gap> {
        self.state.gaps()
    }

    // --- History ---

    /// Revert the last edit. Returns the restored snapshot.
    pub fn undo(&mut self) -> Option<TimelineState> {
        let restored = self.history.undo(self.state.clone())?;
        self.state = restored.clone();
        Some(restored)
    }

    /// Reapply the last undone edit. Returns the restored snapshot.
    pub fn redo(&mut self) -> Option<TimelineState> {
        let restored = self.history.redo(self.state.clone())?;
        self.state = restored.clone();
        Some(restored)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of edits currently available to undo.
    pub fn undo_depth(&self) -> usize {
        self.history.undo_count()
    }

    /// Group the edits until `end_batch` into one undo step (drags,
    /// scripted edit bursts).
    pub fn begin_batch(&mut self, label: &str) {
        self.history.start_batch(label, self.state.clone());
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch();
    }

    // --- Internals ---

    /// Run conflict ripple and gap closing on the edited track per the
    /// current config, plus every other track when cross-track ripple is
    /// on. Gathers what the event emission needs.
    fn settle_track(&self, next: &mut TimelineState, track_id: &TrackId) -> SettleOutcome {
        let mut outcome = SettleOutcome::default();

        if self.config.auto_ripple {
            if self.config.cross_track_ripple {
                let track_ids: Vec<TrackId> = next.tracks.iter().map(|t| t.id.clone()).collect();
                for id in &track_ids {
                    let affected = ripple_conflicts(next, id, self.config.ripple_delay);
                    if !affected.is_empty() {
                        outcome.rippled.push((id.clone(), affected));
                    }
                }
            } else {
                let affected = ripple_conflicts(next, track_id, self.config.ripple_delay);
                if !affected.is_empty() {
                    outcome.rippled.push((track_id.clone(), affected));
                }
            }
        }

        if self.config.gap_closing {
            let moved = close_gaps(next, track_id, self.config.gap_close_max);
            outcome.gap_moved.extend(moved);
            outcome.collect_large_gaps(next, track_id, self.config.gap_close_max);
        }

        outcome
    }

    fn emit_settle_events(&self, outcome: SettleOutcome) {
        if !outcome.gap_moved.is_empty() {
            debug!(moved = outcome.gap_moved.len(), "Gap close pulled clips left");
        }
        for (track_id, affected) in outcome.rippled {
            self.events
                .emit(&EngineEvent::RippleCompleted { track_id, affected });
        }
        for gap in outcome.large_gaps {
            self.events.emit(&EngineEvent::GapDetected { gap });
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

/// What a ripple + gap-close pass did, for event emission.
#[derive(Default)]
struct SettleOutcome {
    /// Per-track affected sets from conflict ripple.
    rippled: Vec<(TrackId, Vec<ClipId>)>,
    /// Clips the gap closer pulled left.
    gap_moved: Vec<ClipId>,
    /// Gaps at or above the close threshold, deliberately left open.
    large_gaps: Vec<Gap>,
}

impl SettleOutcome {
    fn collect_large_gaps(&mut self, state: &TimelineState, track_id: &TrackId, max_gap: TimeMs) {
        for gap in state.gaps_on_track(track_id) {
            if gap.duration() >= max_gap {
                self.large_gaps.push(gap);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_engine() -> Engine {
        let mut engine = Engine::default();
        engine
            .add_track(TrackId::new("v1"), MediaKind::Video)
            .unwrap();
        engine
            .add_track(TrackId::new("a1"), MediaKind::Audio)
            .unwrap();
        engine
    }

    fn make_clip(id: &str, track: &str, start: f64, duration: f64) -> Clip {
        Clip::new(id, track, TimeMs(start), TimeMs(duration), "src_1")
    }

    #[test]
    fn add_track_rejects_duplicates() {
        let mut engine = make_engine();
        let err = engine
            .add_track(TrackId::new("v1"), MediaKind::Video)
            .unwrap_err();
        assert_eq!(err, EditError::DuplicateTrack(TrackId::new("v1")));
    }

    #[test]
    fn add_clip_validates_ids() {
        let mut engine = make_engine();
        let err = engine
            .add_clip(make_clip("c1", "missing", 0.0, 1000.0))
            .unwrap_err();
        assert_eq!(err, EditError::TrackNotFound(TrackId::new("missing")));

        engine.add_clip(make_clip("c1", "v1", 0.0, 1000.0)).unwrap();
        let err = engine
            .add_clip(make_clip("c1", "v1", 5000.0, 1000.0))
            .unwrap_err();
        assert_eq!(err, EditError::DuplicateClip(ClipId::new("c1")));
    }

    #[test]
    fn move_unknown_clip_is_an_error() {
        let mut engine = make_engine();
        let depth = engine.undo_depth();
        let err = engine
            .move_clip(&ClipId::new("nope"), TimeMs(1000.0), None)
            .unwrap_err();
        assert_eq!(err, EditError::ClipNotFound(ClipId::new("nope")));
        assert_eq!(engine.undo_depth(), depth);
    }

    #[test]
    fn move_snaps_to_clip_edge() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 5000.0)).unwrap();
        engine
            .add_clip(make_clip("b", "v1", 6000.0, 3000.0))
            .unwrap();

        // Proposal lands 80 ms short of A's end; within the default
        // threshold, so B snaps flush against A.
        let state = engine
            .move_clip(&ClipId::new("b"), TimeMs(5080.0), None)
            .unwrap();
        let b = state.clip(&ClipId::new("b")).unwrap();
        assert_eq!(b.start, TimeMs(5000.0));
        assert_eq!(b.end(), TimeMs(8000.0));
    }

    #[test]
    fn move_clamps_negative_target() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 3000.0, 1000.0)).unwrap();
        let state = engine
            .move_clip(&ClipId::new("a"), TimeMs(-250.0), None)
            .unwrap();
        assert_eq!(state.clip(&ClipId::new("a")).unwrap().start, TimeMs::ZERO);
    }

    #[test]
    fn move_across_tracks_closes_vacated_gap() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 1000.0)).unwrap();
        engine
            .add_clip(make_clip("b", "v1", 1000.0, 800.0))
            .unwrap();
        engine
            .add_clip(make_clip("c", "v1", 1800.0, 1000.0))
            .unwrap();

        // Pull B to the audio track; C slides into the 800 ms hole it left
        let state = engine
            .move_clip(&ClipId::new("b"), TimeMs(10_000.0), Some(TrackId::new("a1")))
            .unwrap();

        assert_eq!(state.clips_on_track(&TrackId::new("v1")).len(), 2);
        assert_eq!(state.clip(&ClipId::new("c")).unwrap().start, TimeMs(1000.0));
        assert_eq!(
            state.clip(&ClipId::new("b")).unwrap().track_id,
            TrackId::new("a1")
        );
    }

    #[test]
    fn delete_ripples_downstream_left() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 3000.0)).unwrap();
        engine
            .add_clip(make_clip("b", "v1", 3000.0, 3000.0))
            .unwrap();

        let state = engine.delete_clip(&ClipId::new("a")).unwrap();
        let b = state.clip(&ClipId::new("b")).unwrap();
        assert_eq!(b.start, TimeMs::ZERO);
        assert_eq!(b.end(), TimeMs(3000.0));
        assert_eq!(state.duration, TimeMs(3000.0));
    }

    #[test]
    fn delete_without_ripple_leaves_gap() {
        let mut engine = make_engine();
        engine.toggle_auto_ripple(); // off
        engine.add_clip(make_clip("a", "v1", 0.0, 3000.0)).unwrap();
        engine
            .add_clip(make_clip("b", "v1", 3000.0, 3000.0))
            .unwrap();

        let state = engine.delete_clip(&ClipId::new("a")).unwrap();
        assert_eq!(state.clip(&ClipId::new("b")).unwrap().start, TimeMs(3000.0));
    }

    #[test]
    fn delete_ripple_is_track_scoped_by_default() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 3000.0)).unwrap();
        engine
            .add_clip(make_clip("b", "v1", 3000.0, 3000.0))
            .unwrap();
        engine
            .add_clip(make_clip("x", "a1", 4000.0, 1000.0))
            .unwrap();

        let state = engine.delete_clip(&ClipId::new("a")).unwrap();
        assert_eq!(state.clip(&ClipId::new("b")).unwrap().start, TimeMs::ZERO);
        // The audio clip starts after the anchor but sits on another track
        assert_eq!(state.clip(&ClipId::new("x")).unwrap().start, TimeMs(4000.0));
    }

    #[test]
    fn cross_track_ripple_opt_in() {
        let mut engine = make_engine();
        engine.set_config(TimelineConfig {
            cross_track_ripple: true,
            ..TimelineConfig::default()
        });
        engine.add_clip(make_clip("a", "v1", 0.0, 3000.0)).unwrap();
        engine
            .add_clip(make_clip("b", "v1", 3000.0, 3000.0))
            .unwrap();
        engine
            .add_clip(make_clip("x", "a1", 4000.0, 1000.0))
            .unwrap();

        let state = engine.delete_clip(&ClipId::new("a")).unwrap();
        assert_eq!(state.clip(&ClipId::new("b")).unwrap().start, TimeMs::ZERO);
        assert_eq!(state.clip(&ClipId::new("x")).unwrap().start, TimeMs(1000.0));
    }

    #[test]
    fn cross_track_delete_ripple_repairs_origin_pileup() {
        let mut engine = make_engine();
        engine.set_config(TimelineConfig {
            cross_track_ripple: true,
            ..TimelineConfig::default()
        });
        engine.add_clip(make_clip("x", "v1", 0.0, 3000.0)).unwrap();
        engine
            .add_clip(make_clip("p", "a1", 1000.0, 1000.0))
            .unwrap();
        engine
            .add_clip(make_clip("q", "a1", 3500.0, 1000.0))
            .unwrap();

        // Both audio clips shift left by 3000; p clamps at the origin and
        // q lands on top of it until the conflict pass spreads them out
        let state = engine.delete_clip(&ClipId::new("x")).unwrap();

        let clips = state.clips_on_track(&TrackId::new("a1"));
        assert_eq!(clips[0].start, TimeMs::ZERO);
        for pair in clips.windows(2) {
            assert!(pair[1].start >= pair[0].end());
        }
    }

    #[test]
    fn zone_lifecycle() {
        let mut engine = make_engine();
        let id = engine
            .add_magnetic_zone(Some(TrackId::new("v1")), TimeMs(5000.0), ZoneSource::Beat)
            .unwrap();
        assert_eq!(engine.state().zones.len(), 1);

        engine.remove_magnetic_zone(id).unwrap();
        assert!(engine.state().zones.is_empty());

        let err = engine.remove_magnetic_zone(id).unwrap_err();
        assert_eq!(err, EditError::ZoneNotFound(id));

        let err = engine
            .add_magnetic_zone(Some(TrackId::new("missing")), TimeMs(0.0), ZoneSource::Marker)
            .unwrap_err();
        assert_eq!(err, EditError::TrackNotFound(TrackId::new("missing")));
    }

    #[test]
    fn snap_to_beat_zone() {
        let mut engine = make_engine();
        engine
            .add_magnetic_zone(Some(TrackId::new("v1")), TimeMs(5000.0), ZoneSource::Beat)
            .unwrap();
        engine
            .add_clip(make_clip("a", "v1", 9000.0, 1000.0))
            .unwrap();

        // Zones stay out of the candidate set until beat snapping is on
        let state = engine
            .move_clip(&ClipId::new("a"), TimeMs(5080.0), None)
            .unwrap();
        assert_eq!(state.clip(&ClipId::new("a")).unwrap().start, TimeMs(5080.0));

        engine.toggle_snap_to_beat();
        let state = engine
            .move_clip(&ClipId::new("a"), TimeMs(5080.0), None)
            .unwrap();
        assert_eq!(state.clip(&ClipId::new("a")).unwrap().start, TimeMs(5000.0));
    }

    #[test]
    fn import_beats_counts_zones() {
        let mut engine = make_engine();
        let beats = vec![
            Beat {
                time: TimeMs(500.0),
                confidence: 0.9,
                intensity: tc_common::BeatIntensity::High,
            },
            Beat {
                time: TimeMs(1000.0),
                confidence: 0.7,
                intensity: tc_common::BeatIntensity::Medium,
            },
        ];
        assert_eq!(engine.import_beats(None, &beats), 2);
        assert_eq!(engine.state().zones.len(), 2);
        assert_eq!(engine.import_beats(None, &[]), 0);
    }

    #[test]
    fn undo_redo_round_trip() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 1000.0)).unwrap();
        engine
            .move_clip(&ClipId::new("a"), TimeMs(5000.0), None)
            .unwrap();
        assert_eq!(
            engine.state().clip(&ClipId::new("a")).unwrap().start,
            TimeMs(5000.0)
        );

        let undone = engine.undo().unwrap();
        assert_eq!(undone.clip(&ClipId::new("a")).unwrap().start, TimeMs::ZERO);

        let redone = engine.redo().unwrap();
        assert_eq!(
            redone.clip(&ClipId::new("a")).unwrap().start,
            TimeMs(5000.0)
        );
        assert_eq!(engine.state(), &redone);
    }

    #[test]
    fn batch_is_one_undo_step() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 1000.0)).unwrap();

        engine.begin_batch("Drag clip");
        for target in [2000.0, 4000.0, 6000.0] {
            engine
                .move_clip(&ClipId::new("a"), TimeMs(target), None)
                .unwrap();
        }
        engine.end_batch();

        let undone = engine.undo().unwrap();
        assert_eq!(undone.clip(&ClipId::new("a")).unwrap().start, TimeMs::ZERO);
    }

    #[test]
    fn failed_edit_does_not_pollute_history() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 1000.0)).unwrap();
        let depth_before = engine.undo_depth();

        let _ = engine.delete_clip(&ClipId::new("missing"));
        assert_eq!(engine.undo_depth(), depth_before);
        // The last real edit still undoes cleanly
        let undone = engine.undo().unwrap();
        assert!(undone.clip(&ClipId::new("a")).is_none());
    }

    #[test]
    fn toggles_flip_and_report() {
        let mut engine = make_engine();
        assert!(!engine.toggle_auto_ripple());
        assert!(engine.toggle_auto_ripple());
        assert!(!engine.toggle_gap_closing());
        assert!(engine.toggle_snap_to_beat());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut engine = make_engine();
        engine.add_clip(make_clip("a", "v1", 0.0, 1000.0)).unwrap();
        let snapshot = engine.snapshot();
        engine.delete_clip(&ClipId::new("a")).unwrap();
        assert!(snapshot.clip(&ClipId::new("a")).is_some());
        assert!(engine.state().clip(&ClipId::new("a")).is_none());
    }
}
