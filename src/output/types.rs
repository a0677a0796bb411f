//! Detection record and per-file report context.

use crate::recording::Recording;
use crate::species::{FilterMode, SpeciesFilter, SpeciesLabel};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A single species detection in one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Window start time in seconds.
    pub start_time: f32,
    /// Window end time in seconds.
    pub end_time: f32,
    /// Scientific name of the species.
    pub scientific_name: String,
    /// Common name of the species.
    pub common_name: String,
    /// `{scientific_name}_{common_name}`.
    pub label: String,
    /// Detection confidence (0.0 - 1.0).
    pub confidence: f32,
    /// Whether the species is in the location/date-predicted set.
    pub is_predicted_for_location_and_date: bool,
}

impl Detection {
    /// Build a detection from a `ScientificName_CommonName` label.
    ///
    /// Confidence is clamped into [0, 1].
    pub fn from_label(
        label: &str,
        confidence: f32,
        start_time: f32,
        end_time: f32,
        is_predicted_for_location_and_date: bool,
    ) -> Self {
        let species = SpeciesLabel::parse(label);

        Self {
            start_time,
            end_time,
            label: species.label(),
            scientific_name: species.scientific_name,
            common_name: species.common_name,
            confidence: confidence.clamp(0.0, 1.0),
            is_predicted_for_location_and_date,
        }
    }
}

/// What a writer needs to know about the run that produced the detections.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    /// Analyzed audio file.
    pub source_file: PathBuf,
    /// Audio duration in seconds.
    pub duration_secs: f32,
    /// Species filter that was applied.
    pub filter_mode: FilterMode,
    /// Size of the active species set, `None` when unrestricted.
    pub species_count: Option<usize>,
    /// Latitude used for location filtering.
    pub latitude: Option<f64>,
    /// Longitude used for location filtering.
    pub longitude: Option<f64>,
    /// Week used for location filtering.
    pub week: Option<u32>,
    /// Minimum confidence threshold.
    pub min_conf: f32,
    /// Window overlap in seconds.
    pub overlap: f32,
    /// Whether thresholds and filters were bypassed.
    pub return_all_detections: bool,
}

impl RunContext {
    /// Minimal context for a file with no filtering.
    pub fn new(source_file: &Path, duration_secs: f32) -> Self {
        Self {
            source_file: source_file.to_path_buf(),
            duration_secs,
            filter_mode: FilterMode::Unrestricted,
            species_count: None,
            latitude: None,
            longitude: None,
            week: None,
            min_conf: 0.0,
            overlap: 0.0,
            return_all_detections: false,
        }
    }

    /// Context for an analyzed recording.
    pub fn from_recording(recording: &Recording<'_>) -> Self {
        let options = recording.options();
        let mut context = Self::new(recording.path(), recording.duration().unwrap_or_default());
        context.min_conf = options.min_conf;
        context.overlap = options.overlap;
        context.return_all_detections = options.return_all_detections;

        if let Some(filter) = recording.species_filter() {
            context.filter_mode = filter.mode();
            context.species_count = filter.species_count();
            if let SpeciesFilter::Predicted { key, .. } = filter {
                context.latitude = Some(key.latitude());
                context.longitude = Some(key.longitude());
                context.week = Some(key.week());
            }
        }

        context
    }
}
