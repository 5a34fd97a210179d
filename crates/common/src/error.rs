//! Edit error types (thiserror-based).
//!
//! Edits against unknown identifiers are reported explicitly so callers
//! can distinguish "nothing to change" from "target not found".

use thiserror::Error;

use crate::types::{ClipId, TrackId, ZoneId};

/// Errors returned by timeline edit operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("Magnetic zone not found: {0}")]
    ZoneNotFound(ZoneId),

    #[error("Clip already exists: {0}")]
    DuplicateClip(ClipId),

    #[error("Track already exists: {0}")]
    DuplicateTrack(TrackId),
}

/// Convenience Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;
