//! Occurrence model backed by the birdnet-onnx range filter (meta model).

use crate::error::{Error, Result};
use crate::species::{OccurrenceModel, SpeciesOccurrence};
use crate::utils::date::week_to_month_day;
use birdnet_onnx::RangeFilter as BirdnetRangeFilter;
use std::path::Path;
use tracing::debug;

/// Location/season relevance model from a `BirdNET` meta model.
pub struct OnnxOccurrenceModel {
    inner: BirdnetRangeFilter,
}

impl OnnxOccurrenceModel {
    /// Build from a meta model file and the classifier's labels.
    ///
    /// The library threshold is left at zero; the predictor applies its own
    /// relevance floor.
    pub fn load(meta_model_path: &Path, classifier_labels: &[String]) -> Result<Self> {
        let inner = BirdnetRangeFilter::builder()
            .model_path(meta_model_path.to_string_lossy().to_string())
            .from_classifier_labels(classifier_labels)
            .threshold(0.0)
            .build()
            .map_err(|e| Error::OccurrenceModelBuild {
                reason: e.to_string(),
            })?;

        debug!("Loaded occurrence model: {}", meta_model_path.display());
        Ok(Self { inner })
    }
}

impl OccurrenceModel for OnnxOccurrenceModel {
    fn relevance(&self, latitude: f64, longitude: f64, week: u32) -> Result<Vec<SpeciesOccurrence>> {
        let (month, day) = week_to_month_day(week);

        #[allow(clippy::cast_possible_truncation)]
        let scores = self
            .inner
            .predict(latitude as f32, longitude as f32, month, day)
            .map_err(|e| Error::OccurrencePredict {
                reason: e.to_string(),
            })?;

        Ok(scores
            .iter()
            .map(|s| SpeciesOccurrence::from_label(&s.species, s.score))
            .collect())
    }
}
