//! Configuration type definitions.

use crate::constants::occurrence::DEFAULT_RELEVANCE_FLOOR;
use crate::constants::{DEFAULT_MIN_CONFIDENCE, DEFAULT_OVERLAP, DEFAULT_TOP_K};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default classifier and occurrence model.
    pub model: Option<ModelConfig>,

    /// Default analysis settings.
    pub defaults: DefaultsConfig,

    /// Inference settings.
    pub inference: InferenceConfig,
}

/// Model files for the default classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the ONNX classifier.
    pub path: PathBuf,

    /// Path to the classifier labels file.
    pub labels: PathBuf,

    /// Path to the occurrence (meta) model used for location filtering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_model: Option<PathBuf>,
}

/// Default analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Minimum confidence threshold.
    pub min_conf: f32,

    /// Window overlap in seconds.
    pub overlap: f32,

    /// Relevance floor for the predicted species set.
    pub relevance_floor: f32,

    /// Default latitude for location filtering.
    pub latitude: Option<f64>,

    /// Default longitude for location filtering.
    pub longitude: Option<f64>,

    /// Default custom species list file.
    pub species_list_file: Option<PathBuf>,

    /// Output formats.
    pub formats: Vec<OutputFormat>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            min_conf: DEFAULT_MIN_CONFIDENCE,
            overlap: DEFAULT_OVERLAP,
            relevance_floor: DEFAULT_RELEVANCE_FLOOR,
            latitude: None,
            longitude: None,
            species_list_file: None,
            formats: vec![OutputFormat::Csv],
        }
    }
}

/// Inference device configuration.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InferenceDevice {
    /// GPU if available, else CPU.
    #[default]
    Auto,
    /// Prefer GPU, warn and fall back to CPU.
    Gpu,
    /// CPU only.
    Cpu,
}

/// Inference settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Device to use for inference.
    pub device: InferenceDevice,

    /// Per-window cap on `--return-all` output. Species in an active filter
    /// are never cut.
    pub top_k: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            device: InferenceDevice::Auto,
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `BirdNET` results CSV.
    Csv,
    /// JSON document with settings and summary.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
