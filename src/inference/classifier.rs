//! Classifier adapter: one fixed-length window in, per-species scores out.

use crate::config::InferenceDevice;
use crate::error::{Error, Result};
use birdnet_onnx::{
    Classifier, ClassifierBuilder, ExecutionProviderInfo, InferenceOptions,
    available_execution_providers, ort_execution_providers,
};
use std::path::Path;
use tracing::{debug, info, warn};

/// Raw score for one species label in one window.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesScore {
    /// `Scientific_Common` label.
    pub label: String,
    /// Raw classifier score.
    pub score: f32,
}

impl SpeciesScore {
    /// Create a score entry.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Per-window acoustic classifier.
///
/// Implementations must be deterministic for identical input samples and
/// return scores in a stable order; the aggregator keeps that order within a
/// window.
pub trait Classify: Send + Sync {
    /// Sample rate the windows must be at, in Hz.
    fn sample_rate(&self) -> u32;

    /// Window duration in seconds.
    fn window_duration(&self) -> f32;

    /// Samples per window.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn window_len(&self) -> usize {
        (self.window_duration() * self.sample_rate() as f32).round() as usize
    }

    /// Score one window. Fails with [`Error::WindowShape`] if the window is
    /// not exactly [`Classify::window_len`] samples long.
    fn classify(&self, window: &[f32]) -> Result<Vec<SpeciesScore>>;
}

/// Reject a window whose length does not match the model input.
pub fn check_window_len(expected: usize, window: &[f32]) -> Result<()> {
    if window.len() == expected {
        Ok(())
    } else {
        Err(Error::WindowShape {
            expected,
            actual: window.len(),
        })
    }
}

/// `BirdNET`/Perch ONNX classifier.
pub struct OnnxClassifier {
    inner: Classifier,
    options: InferenceOptions,
}

impl OnnxClassifier {
    /// Load a classifier from a model and its labels file.
    ///
    /// Every label is scored for every window; species filtering happens
    /// after classification.
    pub fn load(model_path: &Path, labels_path: &Path, device: InferenceDevice) -> Result<Self> {
        // birdnet-onnx clamps top_k to the label count.
        let builder = ClassifierBuilder::new()
            .model_path(model_path.to_string_lossy().to_string())
            .labels_path(labels_path.to_string_lossy().to_string())
            .top_k(usize::MAX)
            .min_confidence(0.0);

        let (builder, device_name) = select_device(builder, device)?;

        let inner = builder.build().map_err(|e| Error::ClassifierBuild {
            reason: e.to_string(),
        })?;

        info!(
            "Loaded classifier {}: {:?}, {} labels, sample_rate: {}, window: {}s, device: {}",
            model_path.display(),
            inner.config().model_type,
            inner.labels().len(),
            inner.config().sample_rate,
            inner.config().segment_duration,
            device_name
        );

        Ok(Self {
            inner,
            options: InferenceOptions::default(),
        })
    }

    /// Labels in model output order.
    pub fn labels(&self) -> &[String] {
        self.inner.labels()
    }
}

impl Classify for OnnxClassifier {
    fn sample_rate(&self) -> u32 {
        self.inner.config().sample_rate
    }

    fn window_duration(&self) -> f32 {
        self.inner.config().segment_duration
    }

    fn window_len(&self) -> usize {
        self.inner.config().sample_count
    }

    fn classify(&self, window: &[f32]) -> Result<Vec<SpeciesScore>> {
        check_window_len(self.window_len(), window)?;

        let result = self
            .inner
            .predict(window, &self.options)
            .map_err(|e| Error::Inference {
                reason: e.to_string(),
            })?;

        Ok(result
            .predictions
            .into_iter()
            .map(|p| SpeciesScore::new(p.species, p.confidence))
            .collect())
    }
}

/// Pick the execution provider for the requested device.
fn select_device(
    builder: ClassifierBuilder,
    device: InferenceDevice,
) -> Result<(ClassifierBuilder, &'static str)> {
    let cuda_available = available_execution_providers().contains(&ExecutionProviderInfo::Cuda);
    debug!("CUDA execution provider available: {cuda_available}");

    match device {
        InferenceDevice::Cpu => Ok((builder, "CPU")),
        InferenceDevice::Auto if cuda_available => Ok((with_cuda(builder), "CUDA")),
        InferenceDevice::Auto => Ok((builder, "Auto (CPU)")),
        InferenceDevice::Gpu if cuda_available => Ok((with_cuda(builder), "CUDA")),
        InferenceDevice::Gpu => {
            warn!("--gpu requested but CUDA is not available, using CPU");
            Ok((builder, "GPU (fallback to CPU)"))
        }
    }
}

fn with_cuda(builder: ClassifierBuilder) -> ClassifierBuilder {
    builder.execution_provider(ort_execution_providers::CUDAExecutionProvider::default())
}
