//! `tc-beat` — Beat extraction for the TempoCut timeline engine.
//!
//! Turns an audio file (or raw samples) into an ordered sequence of
//! [`Beat`](tc_common::Beat)s the engine imports as magnetic zones:
//!
//! - **Decoding**: Symphonia-based decode of WAV, FLAC, Vorbis, MP3, and
//!   AAC into a mono f32 buffer
//! - **Detection**: short-time energy envelope, local mean/std-dev onset
//!   picking, BPM-window filtering, loudness-based intensity bands
//! - **Job**: a cancellable, timeout-bounded background thread reporting
//!   progress over a crossbeam channel
//!
//! Beat extraction is best-effort by contract: decode failures,
//! cancellation, and timeouts all degrade to an empty beat list so the
//! editing session never aborts over a bad audio file.

pub mod decoder;
pub mod detector;
pub mod error;
pub mod job;

// Re-export primary types at crate root for convenience
pub use decoder::{decode_file, DecodedAudio};
pub use detector::BeatDetector;
pub use error::BeatError;
pub use job::{DetectionHandle, DetectionJob, DetectionProgress};
