//! Application-wide constants.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "birdnetlib";

/// Default minimum confidence threshold for detections.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.1;

/// Default window overlap in seconds.
pub const DEFAULT_OVERLAP: f32 = 0.0;

/// Default per-window cap on return-all output.
pub const DEFAULT_TOP_K: usize = 10;

/// Message for a custom-trained classifier configured with only one of its paths.
pub const CUSTOM_CLASSIFIER_PATHS_MESSAGE: &str =
    "Using a custom-trained classifier requires both classifier_model_path and classifier_labels_path";

/// Confidence value bounds.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
    /// Decimal places for confidence formatting.
    pub const DECIMAL_PLACES: usize = 4;
}

/// Windowing constants.
pub mod window {
    /// Trailing fragments shorter than this are dropped unless they are the only window.
    pub const MIN_TAIL_SECONDS: f32 = 1.5;
}

/// Species occurrence constants.
pub mod occurrence {
    /// Weeks in the occurrence model's year.
    pub const WEEKS_PER_YEAR: u32 = 48;

    /// Weeks per calendar month.
    pub const WEEKS_PER_MONTH: u32 = 4;

    /// Days covered by each of the first three weeks of a month.
    pub const DAYS_PER_WEEK: u32 = 7;

    /// Default relevance floor for the predicted species set.
    pub const DEFAULT_RELEVANCE_FLOOR: f32 = 0.03;
}

/// Output file extensions by format.
pub mod output_extensions {
    /// CSV output extension.
    pub const CSV: &str = ".BirdNET.results.csv";
    /// JSON output extension.
    pub const JSON: &str = ".BirdNET.json";
}

/// Audio file extensions picked up when scanning directories.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "m4a", "aac"];
