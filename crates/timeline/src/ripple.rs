//! Ripple propagation: positional shifts applied to trailing clips after
//! an edit.
//!
//! Two distinct modes exist:
//!
//! - **Deletion ripple** — an unconditional left-shift equal to the removed
//!   clip's duration, applied to every clip starting after the edit anchor.
//! - **Conflict ripple** — after a move or insert, trailing clips that now
//!   overlap their predecessor are pushed right in multiples of a fixed
//!   `ripple_delay` quantum until the overlap clears. This is deliberately
//!   not an exact repack; the quantum keeps shifted clips on a coarse grid.
//!
//! Both modes are track-scoped; the engine facade loops over tracks when
//! cross-track ripple is configured. Tracks are re-sorted after shifting.

use tc_common::{ClipId, TimeMs, TrackId};
use tracing::debug;

use crate::model::TimelineState;

/// Shift every clip on `track_id` starting strictly after `anchor` left by
/// `removed`. Returns the shifted clip ids in ascending start order.
///
/// The shift is unconditional — it applies whether or not a gap or overlap
/// would otherwise result. Starts are clamped at zero, which only matters
/// when the caller ripples a track other than the one the deletion
/// happened on; the clamp can then stack clips at the origin, and such a
/// caller must follow up with [`ripple_conflicts`] to clear the pileup.
pub fn ripple_delete(
    state: &mut TimelineState,
    track_id: &TrackId,
    anchor: TimeMs,
    removed: TimeMs,
) -> Vec<ClipId> {
    let downstream: Vec<ClipId> = state
        .clips_on_track(track_id)
        .iter()
        .filter(|c| c.start > anchor)
        .map(|c| c.id.clone())
        .collect();

    for id in &downstream {
        if let Some(clip) = state.clip_mut(id) {
            clip.start = (clip.start - removed).max(TimeMs::ZERO);
        }
    }
    if !downstream.is_empty() {
        state.sort_track(track_id);
        debug!(
            track_id = %track_id,
            shifted = downstream.len(),
            removed_ms = removed.as_ms(),
            "Deletion ripple applied"
        );
    }
    downstream
}

/// Clear overlaps on `track_id` by shifting each conflicting clip right in
/// multiples of `delay`. Returns the shifted clip ids.
///
/// A single forward walk suffices: each shifted clip lands at or past its
/// predecessor's end, and the updated end then constrains the next clip,
/// propagating the shift down the track. A non-positive `delay` degrades
/// to shifting by exactly the overlap amount.
pub fn ripple_conflicts(
    state: &mut TimelineState,
    track_id: &TrackId,
    delay: TimeMs,
) -> Vec<ClipId> {
    state.sort_track(track_id);
    let order: Vec<ClipId> = state
        .clips_on_track(track_id)
        .iter()
        .map(|c| c.id.clone())
        .collect();

    let mut affected = Vec::new();
    let mut prev_end: Option<TimeMs> = None;

    for id in &order {
        let Some(clip) = state.clip(id) else { continue };
        let (mut start, duration) = (clip.start, clip.duration);

        if let Some(prev_end) = prev_end {
            if start < prev_end {
                let overlap = prev_end - start;
                let shift = if delay.is_positive() {
                    TimeMs((overlap.as_ms() / delay.as_ms()).ceil() * delay.as_ms())
                } else {
                    overlap
                };
                start = start + shift;
                if let Some(clip) = state.clip_mut(id) {
                    clip.start = start;
                }
                affected.push(id.clone());
            }
        }
        prev_end = Some(start + duration);
    }

    if !affected.is_empty() {
        state.sort_track(track_id);
        debug!(
            track_id = %track_id,
            shifted = affected.len(),
            delay_ms = delay.as_ms(),
            "Conflict ripple applied"
        );
    }
    affected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Clip;
    use tc_common::MediaKind;

    fn make_clip(id: &str, track: &str, start: f64, duration: f64) -> Clip {
        Clip::new(id, track, TimeMs(start), TimeMs(duration), "src")
    }

    fn track_starts(state: &TimelineState, track: &str) -> Vec<(String, f64)> {
        state
            .clips_on_track(&TrackId::new(track))
            .iter()
            .map(|c| (c.id.0.clone(), c.start.as_ms()))
            .collect()
    }

    #[test]
    fn delete_ripple_shifts_downstream_unconditionally() {
        let mut state = TimelineState::new();
        state.add_track(TrackId::new("v1"), MediaKind::Video);
        state.insert_clip(make_clip("a", "v1", 0.0, 3000.0));
        state.insert_clip(make_clip("b", "v1", 3000.0, 3000.0));
        state.insert_clip(make_clip("c", "v1", 7000.0, 1000.0));

        // Simulate deleting a [0,3000): anchor 0, removed 3000
        state.remove_clip(&ClipId::new("a"));
        let shifted = ripple_delete(&mut state, &TrackId::new("v1"), TimeMs(0.0), TimeMs(3000.0));

        assert_eq!(shifted.len(), 2);
        assert_eq!(
            track_starts(&state, "v1"),
            vec![("b".to_string(), 0.0), ("c".to_string(), 4000.0)]
        );
    }

    #[test]
    fn delete_ripple_preserves_relative_order() {
        let mut state = TimelineState::new();
        state.add_track(TrackId::new("v1"), MediaKind::Video);
        state.insert_clip(make_clip("a", "v1", 0.0, 1000.0));
        state.insert_clip(make_clip("b", "v1", 2000.0, 1000.0));
        state.insert_clip(make_clip("c", "v1", 4000.0, 1000.0));

        state.remove_clip(&ClipId::new("b"));
        ripple_delete(&mut state, &TrackId::new("v1"), TimeMs(2000.0), TimeMs(1000.0));

        assert_eq!(
            track_starts(&state, "v1"),
            vec![("a".to_string(), 0.0), ("c".to_string(), 3000.0)]
        );
    }

    #[test]
    fn delete_ripple_ignores_clips_before_anchor() {
        let mut state = TimelineState::new();
        state.add_track(TrackId::new("v1"), MediaKind::Video);
        state.insert_clip(make_clip("a", "v1", 0.0, 1000.0));
        state.insert_clip(make_clip("c", "v1", 5000.0, 1000.0));

        let shifted = ripple_delete(&mut state, &TrackId::new("v1"), TimeMs(3000.0), TimeMs(500.0));
        assert_eq!(shifted.len(), 1);
        assert!((state.clip(&ClipId::new("a")).unwrap().start.as_ms() - 0.0).abs() < 1e-9);
        assert!((state.clip(&ClipId::new("c")).unwrap().start.as_ms() - 4500.0).abs() < 1e-9);
    }

    #[test]
    fn conflict_ripple_clears_overlap_in_delay_multiples() {
        let mut state = TimelineState::new();
        state.add_track(TrackId::new("v1"), MediaKind::Video);
        state.insert_clip(make_clip("a", "v1", 0.0, 5000.0));
        // b overlaps a by 250 ms
        state.insert_clip(make_clip("b", "v1", 4750.0, 2000.0));

        let affected = ripple_conflicts(&mut state, &TrackId::new("v1"), TimeMs(100.0));
        assert_eq!(affected, vec![ClipId::new("b")]);
        // 250 ms overlap, 100 ms quantum → shift 300 ms, start 5050
        let b = state.clip(&ClipId::new("b")).unwrap();
        assert!((b.start.as_ms() - 5050.0).abs() < 1e-9);
    }

    #[test]
    fn conflict_ripple_propagates_down_the_track() {
        let mut state = TimelineState::new();
        state.add_track(TrackId::new("v1"), MediaKind::Video);
        state.insert_clip(make_clip("a", "v1", 0.0, 2000.0));
        state.insert_clip(make_clip("b", "v1", 1900.0, 2000.0));
        state.insert_clip(make_clip("c", "v1", 3950.0, 1000.0));

        let affected = ripple_conflicts(&mut state, &TrackId::new("v1"), TimeMs(100.0));
        assert_eq!(affected.len(), 2);

        // b: overlap 100 → shifted to 2000; c now overlaps b's end (4000)
        // by 50 → shifted by one quantum to 4050
        let starts = track_starts(&state, "v1");
        assert!((starts[1].1 - 2000.0).abs() < 1e-9);
        assert!((starts[2].1 - 4050.0).abs() < 1e-9);

        // No overlaps remain
        let clips = state.clips_on_track(&TrackId::new("v1"));
        for pair in clips.windows(2) {
            assert!(pair[1].start >= pair[0].end());
        }
    }

    #[test]
    fn conflict_ripple_no_overlap_is_noop() {
        let mut state = TimelineState::new();
        state.add_track(TrackId::new("v1"), MediaKind::Video);
        state.insert_clip(make_clip("a", "v1", 0.0, 1000.0));
        state.insert_clip(make_clip("b", "v1", 1000.0, 1000.0));

        let affected = ripple_conflicts(&mut state, &TrackId::new("v1"), TimeMs(100.0));
        assert!(affected.is_empty());
        assert!((state.clip(&ClipId::new("b")).unwrap().start.as_ms() - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn conflict_ripple_zero_delay_shifts_exact_overlap() {
        let mut state = TimelineState::new();
        state.add_track(TrackId::new("v1"), MediaKind::Video);
        state.insert_clip(make_clip("a", "v1", 0.0, 1000.0));
        state.insert_clip(make_clip("b", "v1", 700.0, 1000.0));

        ripple_conflicts(&mut state, &TrackId::new("v1"), TimeMs::ZERO);
        assert!((state.clip(&ClipId::new("b")).unwrap().start.as_ms() - 1000.0).abs() < 1e-9);
    }
}
