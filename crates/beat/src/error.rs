//! Beat extraction error types (thiserror-based).
//!
//! These never cross the engine facade boundary — the detector and the
//! detection job both degrade to an empty beat list — but the decode
//! layer reports them precisely so failures are loggable.

use thiserror::Error;

/// Audio decode errors inside the beat extractor.
#[derive(Error, Debug)]
pub enum BeatError {
    /// Failed to open the audio file.
    #[error("Failed to open audio file: {0}")]
    FileOpen(String),

    /// The container/codec is not supported.
    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    /// Decoding error from Symphonia.
    #[error("Decode error: {0}")]
    Decode(String),

    /// No audio track found in the container.
    #[error("No audio track found in file")]
    NoAudioTrack,

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
