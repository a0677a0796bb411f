//! JSON output format writer.

use crate::error::{Error, Result};
use crate::output::{Detection, OutputWriter, RunContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JSON result file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonResultFile {
    /// Source audio file.
    pub source_file: String,
    /// Analysis timestamp.
    pub analysis_date: DateTime<Utc>,
    /// Analysis settings.
    pub settings: JsonSettings,
    /// Detection results.
    pub detections: Vec<JsonDetection>,
    /// Summary statistics.
    pub summary: JsonSummary,
}

/// Analysis settings for JSON output.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSettings {
    /// Minimum confidence threshold.
    pub min_conf: f32,
    /// Window overlap in seconds.
    pub overlap: f32,
    /// Whether thresholds and filters were bypassed.
    pub return_all_detections: bool,
    /// Species filter mode.
    pub species_filter: String,
    /// Size of the active species set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species_count: Option<usize>,
    /// Latitude (location filtering only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    /// Longitude (location filtering only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Week number (location filtering only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
}

/// Single detection in JSON format.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDetection {
    /// Start time in seconds.
    pub start_time: f32,
    /// End time in seconds.
    pub end_time: f32,
    /// Scientific name.
    pub scientific_name: String,
    /// Common name.
    pub common_name: String,
    /// `Scientific_Common` label.
    pub label: String,
    /// Confidence score.
    pub confidence: f32,
    /// Whether the species is predicted for the location and week.
    pub is_predicted_for_location_and_date: bool,
}

impl From<&Detection> for JsonDetection {
    fn from(d: &Detection) -> Self {
        Self {
            start_time: d.start_time,
            end_time: d.end_time,
            scientific_name: d.scientific_name.clone(),
            common_name: d.common_name.clone(),
            label: d.label.clone(),
            confidence: d.confidence,
            is_predicted_for_location_and_date: d.is_predicted_for_location_and_date,
        }
    }
}

/// Summary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonSummary {
    /// Total number of detections.
    pub total_detections: usize,
    /// Number of unique species.
    pub unique_species: usize,
    /// Audio duration in seconds.
    pub audio_duration_seconds: f32,
}

/// Collects detections and writes one JSON document on finalize.
pub struct JsonWriter {
    detections: Vec<Detection>,
    output_path: PathBuf,
    context: RunContext,
}

impl JsonWriter {
    /// Create a JSON writer for `output_path`.
    pub fn new(output_path: &Path, context: RunContext) -> Self {
        Self {
            detections: Vec::new(),
            output_path: output_path.to_path_buf(),
            context,
        }
    }

    fn summary(&self) -> JsonSummary {
        let unique_species: HashSet<&str> =
            self.detections.iter().map(|d| d.label.as_str()).collect();

        JsonSummary {
            total_detections: self.detections.len(),
            unique_species: unique_species.len(),
            audio_duration_seconds: self.context.duration_secs,
        }
    }

    fn document(&self) -> JsonResultFile {
        let context = &self.context;
        JsonResultFile {
            source_file: context.source_file.display().to_string(),
            analysis_date: Utc::now(),
            settings: JsonSettings {
                min_conf: context.min_conf,
                overlap: context.overlap,
                return_all_detections: context.return_all_detections,
                species_filter: context.filter_mode.to_string(),
                species_count: context.species_count,
                lat: context.latitude,
                lon: context.longitude,
                week: context.week,
            },
            detections: self.detections.iter().map(JsonDetection::from).collect(),
            summary: self.summary(),
        }
    }
}

impl OutputWriter for JsonWriter {
    fn write_header(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_detection(&mut self, detection: &Detection) -> Result<()> {
        self.detections.push(detection.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        let write_error = |source: Box<dyn std::error::Error + Send + Sync>| Error::OutputWrite {
            path: self.output_path.clone(),
            source,
        };

        let file = File::create(&self.output_path).map_err(|e| write_error(Box::new(e)))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.document())
            .map_err(|e| write_error(Box::new(e)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::output::write_all;
    use crate::species::FilterMode;
    use tempfile::tempdir;

    #[test]
    fn test_json_writer_basic() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("test.BirdNET.json");

        let mut context = RunContext::new(Path::new("test.wav"), 60.0);
        context.filter_mode = FilterMode::Predicted;
        context.species_count = Some(120);
        context.latitude = Some(35.4244);
        context.longitude = Some(-120.7463);
        context.week = Some(18);

        let detections = [
            Detection::from_label("Passer domesticus_House Sparrow", 0.95, 0.0, 3.0, true),
            Detection::from_label("Passer domesticus_House Sparrow", 0.7, 3.0, 6.0, true),
            Detection::from_label("Corvus corax_Common Raven", 0.4, 3.0, 6.0, false),
        ];

        let mut writer = JsonWriter::new(&output_path, context);
        write_all(&mut writer, &detections).unwrap();

        let content = std::fs::read_to_string(&output_path).unwrap();
        let result: JsonResultFile = serde_json::from_str(&content).unwrap();

        assert_eq!(result.source_file, "test.wav");
        assert_eq!(result.settings.species_filter, "predicted");
        assert_eq!(result.settings.week, Some(18));
        assert_eq!(result.detections.len(), 3);
        assert!(result.detections[0].is_predicted_for_location_and_date);
        assert_eq!(result.summary.total_detections, 3);
        assert_eq!(result.summary.unique_species, 2);
        assert_eq!(result.summary.audio_duration_seconds, 60.0);
    }

    #[test]
    fn test_unfiltered_settings_omit_location() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("empty.BirdNET.json");

        let mut writer = JsonWriter::new(&output_path, RunContext::new(Path::new("empty.wav"), 9.0));
        write_all(&mut writer, &[]).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
        assert!(value["settings"].get("lat").is_none());
        assert_eq!(value["settings"]["species_filter"], "unrestricted");
        assert_eq!(value["summary"]["total_detections"], 0);
    }
}
