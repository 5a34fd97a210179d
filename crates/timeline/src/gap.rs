//! Gap closing: pull clips left to remove small residual gaps.
//!
//! A gap is closed only when it is strictly smaller than the configured
//! limit; larger gaps are treated as intentional (deliberate silence) and
//! left alone. The first clip on a track never moves. The pass is
//! idempotent: rerunning it on an already-closed track changes nothing.

use tc_common::{ClipId, TimeMs, TrackId};
use tracing::debug;

use crate::model::TimelineState;

/// Close all gaps smaller than `max_gap` on one track. Returns the ids of
/// the clips that moved, in ascending start order.
pub fn close_gaps(state: &mut TimelineState, track_id: &TrackId, max_gap: TimeMs) -> Vec<ClipId> {
    let order: Vec<ClipId> = state
        .clips_on_track(track_id)
        .iter()
        .map(|c| c.id.clone())
        .collect();

    let mut moved = Vec::new();
    let mut prev_end: Option<TimeMs> = None;

    for id in &order {
        let Some(clip) = state.clip(id) else { continue };
        let (mut start, duration) = (clip.start, clip.duration);

        if let Some(prev_end) = prev_end {
            let gap = start - prev_end;
            if gap > TimeMs::ZERO && gap < max_gap {
                start = prev_end;
                if let Some(clip) = state.clip_mut(id) {
                    clip.start = start;
                }
                moved.push(id.clone());
            }
        }
        prev_end = Some(start + duration);
    }

    if !moved.is_empty() {
        debug!(
            track_id = %track_id,
            closed = moved.len(),
            max_gap_ms = max_gap.as_ms(),
            "Closed gaps"
        );
    }
    // Pulling a clip back to its predecessor's end cannot reorder the
    // track, so no re-sort is needed.
    moved
}
