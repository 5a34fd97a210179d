//! Background beat detection job.
//!
//! Detection on a full-length song takes long enough that it must not run
//! on the editing thread. `DetectionJob::spawn` runs decode + analysis on
//! a worker thread and reports stages over a crossbeam channel:
//!
//! ```text
//! DetectionJob::spawn()
//!   |
//!   +-- Spawn detection thread
//!   |     1. decode_file(path) -> mono samples
//!   |     2. detector.detect(samples) -> beats
//!   |     3. Send stage updates via channel
//!   |
//!   +-- Returns DetectionHandle (for progress/cancel)
//! ```
//!
//! Cancellation is cooperative via a shared flag checked between stages.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{info, warn};

use tc_common::types::Beat;

use crate::decoder::decode_file;
use crate::detector::BeatDetector;
use crate::error::BeatError;

/// Progress update from a detection job.
#[derive(Clone, Debug)]
pub enum DetectionProgress {
    /// Decoding has started.
    Started,
    /// The audio file was decoded.
    Decoded {
        /// Number of mono samples.
        samples: usize,
        /// Sample rate in Hz.
        sample_rate: u32,
    },
    /// Detection finished with the given beats.
    Completed {
        /// Detected beats, sorted by time.
        beats: Vec<Beat>,
    },
    /// Detection failed.
    Failed {
        /// Error description.
        error: String,
    },
    /// Detection was cancelled.
    Cancelled,
}

impl DetectionProgress {
    /// Check if the job has finished (success, failure, or cancellation).
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}

/// Handle for monitoring and controlling an active detection job.
#[derive(Debug)]
pub struct DetectionHandle {
    /// Receiver for progress updates.
    progress_rx: Receiver<DetectionProgress>,
    /// Shared cancellation flag.
    cancel_flag: Arc<AtomicBool>,
    /// Source path (for display purposes).
    path: PathBuf,
}

impl DetectionHandle {
    /// Try to receive the next progress update (non-blocking).
    pub fn try_recv_progress(&self) -> Option<DetectionProgress> {
        self.progress_rx.try_recv().ok()
    }

    /// Wait for the next progress update (blocking).
    pub fn recv_progress(&self) -> Option<DetectionProgress> {
        self.progress_rx.recv().ok()
    }

    /// Block until the job finishes and return the detected beats.
    ///
    /// Returns an empty list if the job failed, was cancelled, or did not
    /// finish within `timeout` (in which case cancellation is requested).
    pub fn wait(&self, timeout: Duration) -> Vec<Beat> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.progress_rx.recv_timeout(remaining) {
                Ok(DetectionProgress::Completed { beats }) => return beats,
                Ok(DetectionProgress::Failed { error }) => {
                    warn!(path = %self.path.display(), error = %error, "Beat detection failed");
                    return Vec::new();
                }
                Ok(DetectionProgress::Cancelled) => return Vec::new(),
                Ok(_) => continue,
                Err(_) => {
                    self.cancel();
                    return Vec::new();
                }
            }
        }
    }

    /// Request cancellation of the job.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::SeqCst);
        info!(path = %self.path.display(), "Beat detection cancellation requested");
    }

    /// Check if cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancel_flag.load(Ordering::SeqCst)
    }

    /// Get the source path being analysed.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Spawner for background detection jobs.
pub struct DetectionJob;

impl DetectionJob {
    /// Start detection on `path` using the given detector.
    ///
    /// Spawns the worker thread and returns a `DetectionHandle` that the
    /// caller uses to monitor progress and request cancellation.
    pub fn spawn(path: PathBuf, detector: BeatDetector) -> Result<DetectionHandle, BeatError> {
        let (progress_tx, progress_rx) = channel::unbounded::<DetectionProgress>();
        let cancel_flag = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel_flag.clone();

        info!(path = %path.display(), "Starting beat detection");

        let path_clone = path.clone();
        std::thread::Builder::new()
            .name("beat-detection".to_string())
            .spawn(move || {
                Self::run(path_clone, detector, progress_tx, cancel_clone);
            })
            .map_err(|e| BeatError::Decode(format!("Failed to spawn detection thread: {e}")))?;

        Ok(DetectionHandle {
            progress_rx,
            cancel_flag,
            path,
        })
    }

    /// The detection pipeline (runs on the worker thread).
    fn run(
        path: PathBuf,
        detector: BeatDetector,
        progress_tx: Sender<DetectionProgress>,
        cancel_flag: Arc<AtomicBool>,
    ) {
        let _ = progress_tx.send(DetectionProgress::Started);

        let audio = match decode_file(&path) {
            Ok(audio) => audio,
            Err(e) => {
                let _ = progress_tx.send(DetectionProgress::Failed {
                    error: e.to_string(),
                });
                return;
            }
        };

        if cancel_flag.load(Ordering::SeqCst) {
            let _ = progress_tx.send(DetectionProgress::Cancelled);
            info!(path = %path.display(), "Beat detection cancelled after decode");
            return;
        }

        let _ = progress_tx.send(DetectionProgress::Decoded {
            samples: audio.samples.len(),
            sample_rate: audio.sample_rate,
        });

        let beats = detector.detect(&audio.samples, audio.sample_rate);

        if cancel_flag.load(Ordering::SeqCst) {
            let _ = progress_tx.send(DetectionProgress::Cancelled);
            info!(path = %path.display(), "Beat detection cancelled after analysis");
            return;
        }

        info!(path = %path.display(), beats = beats.len(), "Beat detection completed");
        let _ = progress_tx.send(DetectionProgress::Completed { beats });
    }
}
