//! Audio resampling using rubato.

use crate::error::{Error, Result};
use audioadapter_buffers::direct::SequentialSlice;
use rubato::{Fft, FixedSync, Resampler};

/// Input block size fed to the FFT resampler.
const BLOCK_FRAMES: usize = 1024;

/// Resample mono audio to `to_rate`.
///
/// Returns the input unchanged if already at the target rate. The final
/// partial block is zero-padded and its output trimmed to the proportional
/// length, so the result duration matches the input duration.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        BLOCK_FRAMES,
        1,
        1,
        FixedSync::Both,
    )
    .map_err(|e| Error::Resample {
        reason: e.to_string(),
    })?;

    let block = resampler.input_frames_next();
    let expected_len = scaled_len(samples.len(), from_rate, to_rate);
    let mut output = Vec::with_capacity(expected_len + BLOCK_FRAMES);

    let mut blocks = samples.chunks_exact(block);
    for chunk in blocks.by_ref() {
        output.extend(process_block(&mut resampler, chunk)?);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut padded = tail.to_vec();
        padded.resize(block, 0.0);
        let resampled = process_block(&mut resampler, &padded)?;
        let keep = scaled_len(tail.len(), from_rate, to_rate).min(resampled.len());
        output.extend_from_slice(&resampled[..keep]);
    }

    Ok(output)
}

/// Run one mono block through the resampler.
fn process_block(resampler: &mut Fft<f32>, block: &[f32]) -> Result<Vec<f32>> {
    let input = SequentialSlice::new(block, 1, block.len()).map_err(|e| Error::Resample {
        reason: format!("failed to create input adapter: {e}"),
    })?;

    let resampled = resampler
        .process(&input, 0, None)
        .map_err(|e| Error::Resample {
            reason: e.to_string(),
        })?;

    Ok(resampled.take_data())
}

/// Number of output frames for `input_len` frames after rate conversion.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn scaled_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    ((input_len as f64) * f64::from(to_rate) / f64::from(from_rate)).ceil() as usize
}
