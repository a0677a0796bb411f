//! Fixed-length analysis windows with overlap.

use crate::constants::window::MIN_TAIL_SECONDS;

/// One classifier window and its position in the recording.
#[derive(Debug, Clone)]
pub struct AudioWindow {
    /// Exactly one window of samples; the last window is zero-padded.
    pub samples: Vec<f32>,
    /// Start time in seconds.
    pub start_time: f32,
    /// End time in seconds (start + window duration).
    pub end_time: f32,
}

/// Samples between consecutive window starts.
///
/// Zero when the overlap, rounded to whole samples, covers the whole window.
pub fn window_stride(sample_rate: u32, window_duration: f32, overlap: f32) -> usize {
    seconds_to_samples(window_duration, sample_rate)
        .saturating_sub(seconds_to_samples(overlap, sample_rate))
}

/// Split mono samples into windows of `window_duration` seconds.
///
/// Consecutive windows share `overlap` seconds. A trailing fragment shorter
/// than 1.5 s is dropped unless it is the only window. Returns no windows when
/// [`window_stride`] is zero.
pub fn split_windows(
    samples: &[f32],
    sample_rate: u32,
    window_duration: f32,
    overlap: f32,
) -> Vec<AudioWindow> {
    let window_len = seconds_to_samples(window_duration, sample_rate);
    let stride = window_stride(sample_rate, window_duration, overlap);
    let min_tail = seconds_to_samples(MIN_TAIL_SECONDS, sample_rate).min(window_len);

    if stride == 0 || samples.is_empty() {
        return Vec::new();
    }

    let mut windows = Vec::with_capacity(samples.len() / stride + 1);

    for pos in (0..samples.len()).step_by(stride) {
        let end = (pos + window_len).min(samples.len());
        if end - pos < min_tail && !windows.is_empty() {
            break;
        }

        let mut window = samples[pos..end].to_vec();
        window.resize(window_len, 0.0);

        #[allow(clippy::cast_precision_loss)]
        let start_time = pos as f32 / sample_rate as f32;

        windows.push(AudioWindow {
            samples: window,
            start_time,
            end_time: start_time + window_duration,
        });

        if end == samples.len() {
            break;
        }
    }

    windows
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn seconds_to_samples(seconds: f32, sample_rate: u32) -> usize {
    (seconds.max(0.0) * sample_rate as f32).round() as usize
}
