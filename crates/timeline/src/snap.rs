//! Snap resolution: replace a proposed clip position with the nearest
//! attraction candidate within a threshold.
//!
//! `resolve` is a pure function — identical inputs always yield the
//! identical output. The candidate set is position 0, the start and end
//! of every clip except the one being moved (all tracks), and — when
//! beat-snapping is enabled — the magnetic zones scoped to the target
//! track plus the global ones.

use tc_common::{ClipId, TimeMs, TrackId};

use crate::model::TimelineState;

/// Which zones participate in a snap resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapScope {
    /// Track the clip is being placed on.
    pub target_track: TrackId,
    /// Whether magnetic zones join the candidate set at all.
    pub snap_to_beat: bool,
}

/// Resolve a proposed position to the nearest attraction candidate.
///
/// Selection picks the candidate minimizing absolute distance to the
/// proposal; ties break toward the lowest candidate value so resolution
/// stays deterministic. If even the nearest candidate is farther than
/// `threshold`, the proposal is returned unchanged.
pub fn resolve(
    proposed: TimeMs,
    moving_clip: &ClipId,
    state: &TimelineState,
    threshold: TimeMs,
    scope: &SnapScope,
) -> TimeMs {
    let mut best: Option<(TimeMs, TimeMs)> = None; // (distance, candidate)

    let mut consider = |candidate: TimeMs| {
        let distance = candidate.distance(proposed);
        let better = match &best {
            None => true,
            Some((best_dist, best_cand)) => match distance.total_cmp(best_dist) {
                std::cmp::Ordering::Less => true,
                std::cmp::Ordering::Equal => candidate.total_cmp(best_cand).is_lt(),
                std::cmp::Ordering::Greater => false,
            },
        };
        if better {
            best = Some((distance, candidate));
        }
    };

    consider(TimeMs::ZERO);
    for clip in state.all_clips() {
        if &clip.id == moving_clip {
            continue;
        }
        consider(clip.start);
        consider(clip.end());
    }
    if scope.snap_to_beat {
        for zone in state.zones.for_track(&scope.target_track) {
            consider(zone.position);
        }
    }

    match best {
        Some((distance, candidate)) if distance <= threshold => candidate,
        _ => proposed,
    }
}
