//! `tc-common` — Shared types, configuration, and errors for the TempoCut
//! timeline engine.
//!
//! This crate is the foundation that all other engine crates depend on.
//! It defines the core abstractions:
//!
//! - **Types**: `TimeMs`, `ClipId`, `TrackId`, `ZoneId`, `SourceRef` (newtypes for safety)
//! - **Beats**: `Beat`, `BeatIntensity` (detector output consumed by the zone registry)
//! - **Config**: `TimelineConfig`, `BeatDetectorConfig`
//! - **Errors**: `EditError` (thiserror-based)

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used items at crate root
pub use config::{BeatDetectorConfig, TimelineConfig};
pub use error::{EditError, EditResult};
pub use types::{Beat, BeatIntensity, ClipId, MediaKind, SourceRef, TimeMs, TrackId, ZoneId};
