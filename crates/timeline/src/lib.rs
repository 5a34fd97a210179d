//! `tc-timeline` — Timeline data model and edit algorithms for TempoCut.
//!
//! This crate holds the authoritative layout of placed media clips across
//! parallel tracks, plus the pure algorithms the engine facade composes
//! into edits:
//!
//! - **Model**: `TimelineState`, `Track`, `Clip`, `Gap` — an immutable-value
//!   snapshot; every edit produces a new state
//! - **Zones**: `ZoneRegistry`, `MagneticZone` — labeled attraction points
//!   from detected beats or manual markers
//! - **Snap**: nearest-candidate position resolution within a threshold
//! - **Ripple**: propagated shifts that close deletion gaps or clear
//!   move-introduced overlaps
//! - **Gap close**: removal of small residual gaps between clips
//!
//! The model's mutation primitives perform no validation; invariant
//! enforcement (sorted order, non-overlap) is the engine facade's job.

pub mod gap;
pub mod model;
pub mod ripple;
pub mod snap;
pub mod zones;

// Re-export primary API
pub use gap::close_gaps;
pub use model::{Clip, Gap, TimelineState, Track};
pub use ripple::{ripple_conflicts, ripple_delete};
pub use snap::{resolve, SnapScope};
pub use zones::{MagneticZone, ZoneRegistry, ZoneSource};
