//! Audio decode via Symphonia, mixed down to mono for analysis.
//!
//! The detector only needs a loudness envelope, so multi-channel audio is
//! averaged to a single channel while decoding. The whole file is decoded
//! in one pass; the resulting buffer is a plain value the caller drops
//! when analysis finishes, which keeps transient decode artifacts scoped
//! to the detection run on every exit path.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use crate::error::BeatError;

/// Mono audio ready for beat analysis.
#[derive(Clone, Debug)]
pub struct DecodedAudio {
    /// Mono f32 samples (channel average).
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl DecodedAudio {
    /// Total duration in milliseconds.
    pub fn duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64 * 1000.0
    }
}

/// Decode an entire audio file to mono f32.
///
/// Probes the container, picks the first audio track, and decodes packet
/// by packet. Corrupted packets are skipped with a warning rather than
/// failing the run.
pub fn decode_file(path: &Path) -> Result<DecodedAudio, BeatError> {
    let file = File::open(path).map_err(|e| BeatError::FileOpen(format!("{path:?}: {e}")))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| BeatError::UnsupportedFormat(format!("{e}")))?;

    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| {
            t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL
                && t.codec_params.channels.is_some()
        })
        .ok_or(BeatError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();
    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| BeatError::Decode("No sample rate in codec params".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| BeatError::UnsupportedFormat(format!("Codec init failed: {e}")))?;

    let mut samples = Vec::new();

    loop {
        let packet = match reader.next_packet() {
            Ok(p) => p,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(BeatError::Decode(format!("{e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(msg)) => {
                warn!(error = %msg, "Skipping corrupted audio packet");
                continue;
            }
            Err(e) => return Err(BeatError::Decode(format!("{e}"))),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();
        if num_frames == 0 {
            continue;
        }

        let channels = spec.channels.count();
        let mut buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
        buf.copy_interleaved_ref(decoded);

        // Mix down to mono: average across channels frame by frame
        samples.reserve(num_frames);
        for frame in buf.samples().chunks_exact(channels) {
            let sum: f32 = frame.iter().sum();
            samples.push(sum / channels as f32);
        }
    }

    debug!(
        samples = samples.len(),
        sample_rate, "Decoded audio for beat analysis"
    );

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}
