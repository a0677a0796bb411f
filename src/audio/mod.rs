//! Audio decoding, resampling and windowing.

mod chunker;
mod decode;
mod resample;

pub use chunker::{AudioWindow, split_windows, window_stride};
pub use decode::{DecodedAudio, decode_audio_file};
pub use resample::resample;

use crate::error::Result;
use std::path::Path;
use tracing::debug;

/// Supplies decoded mono PCM for a file path.
pub trait AudioDecoder: Send + Sync {
    /// Decode `path` to mono samples at `sample_rate`.
    fn decode(&self, path: &Path, sample_rate: u32) -> Result<DecodedAudio>;
}

/// Decoder backed by symphonia with rubato resampling.
#[derive(Debug, Default, Clone, Copy)]
pub struct SymphoniaDecoder;

impl AudioDecoder for SymphoniaDecoder {
    fn decode(&self, path: &Path, sample_rate: u32) -> Result<DecodedAudio> {
        let decoded = decode_audio_file(path)?;
        if decoded.sample_rate == sample_rate {
            return Ok(decoded);
        }

        debug!(
            "Resampling from {} Hz to {} Hz...",
            decoded.sample_rate, sample_rate
        );
        let samples = resample(decoded.samples, decoded.sample_rate, sample_rate)?;
        Ok(DecodedAudio::new(samples, sample_rate))
    }
}
