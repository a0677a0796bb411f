//! Audio decoding using symphonia.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

/// Decoded mono audio.
#[derive(Debug, Clone)]
pub struct DecodedAudio {
    /// Mono f32 samples in [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Duration in seconds.
    pub duration_secs: f32,
}

impl DecodedAudio {
    /// Wrap mono samples, deriving the duration from their count.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        let duration_secs = if sample_rate == 0 {
            0.0
        } else {
            samples.len() as f32 / sample_rate as f32
        };

        Self {
            samples,
            sample_rate,
            duration_secs,
        }
    }
}

/// Decode the first audio track of a file to mono f32 at its native rate.
///
/// Any sample format symphonia decodes is accepted; multichannel audio is
/// averaged down to mono. Corrupt packets are skipped with a warning.
pub fn decode_audio_file(path: &Path) -> Result<DecodedAudio> {
    let open_error = |e: Box<dyn std::error::Error + Send + Sync>| Error::AudioOpen {
        path: path.to_path_buf(),
        source: e,
    };
    let decode_error = |e: Box<dyn std::error::Error + Send + Sync>| Error::AudioDecode {
        path: path.to_path_buf(),
        source: e,
    };

    let file = File::open(path).map_err(|e| open_error(Box::new(e)))?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

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
        .map_err(|e| open_error(Box::new(e)))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| decode_error("missing sample rate".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(Box::new(e)))?;

    let mut samples = Vec::new();
    let mut interleaved: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(decode_error(Box::new(e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!("Skipping corrupt packet in {}: {reason}", path.display());
                continue;
            }
            Err(e) => return Err(decode_error(Box::new(e))),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count().max(1);
        let capacity = decoded.capacity() as u64;

        let needed = decoded.capacity() * channels;
        if interleaved
            .as_ref()
            .is_none_or(|buffer| buffer.capacity() < needed)
        {
            interleaved = Some(SampleBuffer::new(capacity, spec));
        }

        if let Some(buffer) = interleaved.as_mut() {
            buffer.copy_interleaved_ref(decoded);
            downmix_into(buffer.samples(), channels, &mut samples);
        }
    }

    let audio = DecodedAudio::new(samples, sample_rate);
    debug!(
        "Decoded {}: {} samples at {} Hz ({:.1}s)",
        path.display(),
        audio.samples.len(),
        audio.sample_rate,
        audio.duration_secs
    );
    Ok(audio)
}

/// Average interleaved frames to mono and append them to `output`.
#[allow(clippy::cast_precision_loss)]
fn downmix_into(interleaved: &[f32], channels: usize, output: &mut Vec<f32>) {
    if channels == 1 {
        output.extend_from_slice(interleaved);
        return;
    }

    let scale = 1.0 / channels as f32;
    output.extend(
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() * scale),
    );
}
