//! Error types for birdnetlib.

use std::path::PathBuf;

/// Result type alias for birdnetlib operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for birdnetlib.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The analyzer was constructed with an invalid combination of options.
    ///
    /// Displays as the bare message so callers can compare it verbatim.
    #[error("{message}")]
    AnalyzerConfiguration {
        /// Description of the configuration problem.
        message: String,
    },

    /// Recording parameters failed pre-flight validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to read species list file.
    #[error("failed to read species list file '{path}'")]
    SpeciesListRead {
        /// Path to the species list file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No valid audio files found.
    #[error("no valid audio files found in the provided paths")]
    NoValidAudioFiles,

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: PathBuf,
    },

    /// Failed to resample audio.
    #[error("failed to resample audio: {reason}")]
    Resample {
        /// Description of the resampling failure.
        reason: String,
    },

    /// A window handed to the classifier has the wrong number of samples.
    #[error("window has {actual} samples, classifier expects {expected}")]
    WindowShape {
        /// Sample count the classifier expects.
        expected: usize,
        /// Sample count that was supplied.
        actual: usize,
    },

    /// Failed to initialize ONNX runtime.
    #[error("failed to initialize ONNX runtime: {reason}")]
    RuntimeInitialization {
        /// Description of the initialization failure.
        reason: String,
    },

    /// Failed to build classifier.
    #[error("failed to build classifier: {reason}")]
    ClassifierBuild {
        /// Description of the build failure.
        reason: String,
    },

    /// Inference failed.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// Failed to build the species occurrence model.
    #[error("failed to build occurrence model: {reason}")]
    OccurrenceModelBuild {
        /// Description of the build failure.
        reason: String,
    },

    /// Failed to compute species occurrence scores.
    #[error("failed to predict species occurrence: {reason}")]
    OccurrencePredict {
        /// Description of the prediction failure.
        reason: String,
    },

    /// Location filtering was requested but no occurrence model is loaded.
    #[error("location filtering requires an occurrence (meta) model, none is configured")]
    OccurrenceModelMissing,

    /// Failed to write an output file.
    #[error("failed to write output file '{path}'")]
    OutputWrite {
        /// Path to the output file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A rejected combination of recording parameters.
///
/// Produced by the pre-flight check that runs before any audio is decoded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Location filtering cannot be combined with a custom species list.
    #[error(
        "lat/lon cannot be used together with a custom species list; the custom list already restricts the species"
    )]
    LocationWithCustomSpeciesList,

    /// Only one of latitude and longitude was given.
    #[error("lat and lon must be supplied together (got lat={lat:?}, lon={lon:?})")]
    UnpairedCoordinates {
        /// Supplied latitude, if any.
        lat: Option<f64>,
        /// Supplied longitude, if any.
        lon: Option<f64>,
    },

    /// Latitude outside -90..=90.
    #[error("invalid latitude: {value} (must be -90.0 to 90.0)")]
    InvalidLatitude {
        /// Invalid latitude value.
        value: f64,
    },

    /// Longitude outside -180..=180.
    #[error("invalid longitude: {value} (must be -180.0 to 180.0)")]
    InvalidLongitude {
        /// Invalid longitude value.
        value: f64,
    },

    /// Week number outside 1..=48.
    #[error("week must be between 1 and 48, got {value}")]
    WeekOutOfRange {
        /// Invalid week value.
        value: u32,
    },

    /// Both a week number and a date were given.
    #[error("week and date are mutually exclusive")]
    WeekAndDate,

    /// Minimum confidence outside 0..=1.
    #[error("min_conf must be between 0.0 and 1.0, got {value}")]
    InvalidConfidence {
        /// Invalid confidence value.
        value: f32,
    },

    /// Overlap negative or not shorter than the window.
    #[error("overlap must be at least 0 and less than the {window}s window, got {value}")]
    InvalidOverlap {
        /// Invalid overlap in seconds.
        value: f32,
        /// Window duration in seconds.
        window: f32,
    },

    /// Overlap so close to the window length that windows would not advance.
    #[error("overlap {value}s leaves less than one sample between windows at {sample_rate} Hz")]
    OverlapLeavesNoStride {
        /// Overlap in seconds.
        value: f32,
        /// Classifier sample rate.
        sample_rate: u32,
    },
}
