//! Energy-based beat detection.
//!
//! The detector computes an RMS energy envelope over short frames, marks
//! frames whose energy stands out from their local neighbourhood as beat
//! candidates, enforces a minimum spacing derived from the configured BPM
//! ceiling, and finally keeps the longest run of candidates whose
//! inter-beat intervals stay inside the configured tempo range.

use std::path::Path;

use tc_common::config::BeatDetectorConfig;
use tc_common::types::{Beat, BeatIntensity, TimeMs};
use tracing::{debug, warn};

use crate::decoder::decode_file;

/// Analysis frame length in samples.
const FRAME_SIZE: usize = 1024;
/// Hop between consecutive frames in samples.
const HOP_SIZE: usize = 512;
/// Half-width of the local statistics window, in frames (~0.5s at 44.1kHz).
const LOCAL_WINDOW: usize = 43;
/// Z-score that maps to confidence 1.0.
const CONFIDENCE_NORM: f32 = 4.0;
/// RMS window half-width for intensity classification, in milliseconds.
const INTENSITY_WINDOW_MS: f64 = 50.0;

/// Detects beats in decoded mono audio.
#[derive(Clone, Debug)]
pub struct BeatDetector {
    config: BeatDetectorConfig,
}

impl Default for BeatDetector {
    fn default() -> Self {
        Self::new(BeatDetectorConfig::default())
    }
}

impl BeatDetector {
    pub fn new(config: BeatDetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BeatDetectorConfig {
        &self.config
    }

    /// Detect beats in a mono sample buffer.
    ///
    /// Returns beats sorted by time. An empty or too-short buffer yields
    /// no beats.
    pub fn detect(&self, samples: &[f32], sample_rate: u32) -> Vec<Beat> {
        if sample_rate == 0 || samples.len() < FRAME_SIZE {
            return Vec::new();
        }

        let envelope = energy_envelope(samples);
        let candidates = self.pick_candidates(&envelope, sample_rate);
        let spaced = self.enforce_min_spacing(candidates);
        let beats = self.filter_tempo_range(spaced);

        let beats: Vec<Beat> = beats
            .into_iter()
            .map(|c| Beat {
                time: c.time,
                confidence: c.confidence,
                intensity: classify_intensity(samples, sample_rate, c.time),
            })
            .collect();

        debug!(beats = beats.len(), "Beat detection complete");
        beats
    }

    /// Decode a file and detect beats in it.
    ///
    /// Decode failures are logged and yield an empty beat list rather than
    /// an error, so a bad media file never aborts an editing session.
    pub fn detect_file(&self, path: &Path) -> Vec<Beat> {
        match decode_file(path) {
            Ok(audio) => self.detect(&audio.samples, audio.sample_rate),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Beat detection decode failed");
                Vec::new()
            }
        }
    }

    /// Frames whose energy exceeds the local mean by `sensitivity` standard
    /// deviations and which are a local maximum of the envelope.
    fn pick_candidates(&self, envelope: &[f32], sample_rate: u32) -> Vec<Candidate> {
        let mut candidates = Vec::new();

        for i in 0..envelope.len() {
            let lo = i.saturating_sub(LOCAL_WINDOW);
            let hi = (i + LOCAL_WINDOW + 1).min(envelope.len());
            let window = &envelope[lo..hi];

            let mean = window.iter().sum::<f32>() / window.len() as f32;
            let variance =
                window.iter().map(|e| (e - mean) * (e - mean)).sum::<f32>() / window.len() as f32;
            let std = variance.sqrt();

            let e = envelope[i];
            if std <= f32::EPSILON || e <= mean + self.config.sensitivity as f32 * std {
                continue;
            }

            // Local maximum: strict on the right so a flat-topped peak
            // fires exactly once
            let above_prev = i == 0 || e >= envelope[i - 1];
            let above_next = i + 1 >= envelope.len() || e > envelope[i + 1];
            if !above_prev || !above_next {
                continue;
            }

            let z = (e - mean) / std;
            let confidence = (z / CONFIDENCE_NORM).clamp(0.0, 1.0);
            if confidence < self.config.min_confidence {
                continue;
            }

            let time_ms = (i * HOP_SIZE) as f64 / sample_rate as f64 * 1000.0;
            candidates.push(Candidate {
                time: TimeMs::from_ms(time_ms),
                confidence,
            });
        }

        candidates
    }

    /// Drop candidates closer together than one beat period at `max_bpm`,
    /// keeping the stronger of each conflicting pair.
    fn enforce_min_spacing(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let min_interval = 60_000.0 / self.config.max_bpm;
        let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());

        for c in candidates {
            let too_close = kept
                .last()
                .is_some_and(|last| (c.time.as_ms() - last.time.as_ms()) < min_interval);
            if !too_close {
                kept.push(c);
            } else if kept.last().is_some_and(|last| c.confidence > last.confidence) {
                let end = kept.len() - 1;
                kept[end] = c;
            }
        }

        kept
    }

    /// Keep the longest run of candidates whose consecutive intervals all
    /// lie inside the configured tempo range, so every adjacent pair of the
    /// returned beats implies a tempo within `[min_bpm, max_bpm]`. A beat
    /// with no in-range neighbour is dropped; a lone candidate has no
    /// interval to judge and is kept.
    fn filter_tempo_range(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        if candidates.len() < 2 {
            return candidates;
        }

        let min_interval = 60_000.0 / self.config.max_bpm;
        let max_interval = 60_000.0 / self.config.min_bpm;

        // Maximal runs of in-tempo intervals; the first of the longest
        // runs wins.
        let mut best: Option<(usize, usize)> = None;
        let mut start = 0;
        for i in 1..=candidates.len() {
            let in_range = i < candidates.len() && {
                let dt = candidates[i].time.as_ms() - candidates[i - 1].time.as_ms();
                dt >= min_interval && dt <= max_interval
            };
            if !in_range {
                let len = i - start;
                if len > 1 && best.map_or(true, |(_, l)| len > l) {
                    best = Some((start, len));
                }
                start = i;
            }
        }

        match best {
            Some((start, len)) => candidates[start..start + len].to_vec(),
            None => Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
struct Candidate {
    time: TimeMs,
    confidence: f32,
}

/// RMS energy per hop-spaced frame.
fn energy_envelope(samples: &[f32]) -> Vec<f32> {
    let mut envelope = Vec::new();
    let mut pos = 0;
    while pos + FRAME_SIZE <= samples.len() {
        let frame = &samples[pos..pos + FRAME_SIZE];
        let sum_sq: f32 = frame.iter().map(|s| s * s).sum();
        envelope.push((sum_sq / FRAME_SIZE as f32).sqrt());
        pos += HOP_SIZE;
    }
    envelope
}

/// Classify perceived strength from RMS level around the beat time.
fn classify_intensity(samples: &[f32], sample_rate: u32, time: TimeMs) -> BeatIntensity {
    let center = (time.as_ms() / 1000.0 * sample_rate as f64) as usize;
    let half = (INTENSITY_WINDOW_MS / 1000.0 * sample_rate as f64) as usize;
    let lo = center.saturating_sub(half);
    let hi = (center + half).min(samples.len());
    if lo >= hi {
        return BeatIntensity::Low;
    }

    let window = &samples[lo..hi];
    let sum_sq: f32 = window.iter().map(|s| s * s).sum();
    let rms = (sum_sq / window.len() as f32).sqrt();

    if rms >= 0.2 {
        BeatIntensity::High
    } else if rms >= 0.05 {
        BeatIntensity::Medium
    } else {
        BeatIntensity::Low
    }
}
