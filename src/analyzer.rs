//! Analyzer: the long-lived holder of models, species list and occurrence cache.
//!
//! One analyzer is built per configuration and shared by every
//! [`Recording`](crate::Recording) that uses it. The occurrence cache lives
//! on the analyzer instance, so two analyzers never share predictions.

use crate::audio::{AudioDecoder, SymphoniaDecoder};
use crate::config::{InferenceDevice, ModelConfig};
use crate::constants::occurrence::DEFAULT_RELEVANCE_FLOOR;
use crate::constants::CUSTOM_CLASSIFIER_PATHS_MESSAGE;
use crate::error::{Error, Result};
use crate::inference::{Classify, OnnxClassifier, OnnxOccurrenceModel};
use crate::species::{
    FilterPlan, OccurrenceKey, OccurrenceModel, OccurrencePredictor, PredictedSpecies,
    SpeciesFilter, read_species_list,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Shared analysis context.
pub struct Analyzer {
    classifier: Box<dyn Classify>,
    decoder: Box<dyn AudioDecoder>,
    predictor: OccurrencePredictor,
    custom_species_list: Option<Vec<String>>,
    custom_species_set: Option<Arc<HashSet<String>>>,
    custom_species_list_path: Option<PathBuf>,
    classifier_model_path: Option<PathBuf>,
    classifier_labels_path: Option<PathBuf>,
    return_all_top_k: Option<usize>,
}

impl Analyzer {
    /// Start building an analyzer.
    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::default()
    }

    /// The classifier adapter.
    pub fn classifier(&self) -> &dyn Classify {
        self.classifier.as_ref()
    }

    /// The audio decoder.
    pub fn decoder(&self) -> &dyn AudioDecoder {
        self.decoder.as_ref()
    }

    /// The resolved custom species list, in file or input order.
    pub fn custom_species_list(&self) -> Option<&[String]> {
        self.custom_species_list.as_deref()
    }

    /// Per-window cap on `return_all_detections` output, if any.
    ///
    /// Species allowed by an active custom or predicted filter are kept even
    /// when they rank below the cap.
    pub fn return_all_top_k(&self) -> Option<usize> {
        self.return_all_top_k
    }

    /// Whether a custom species list is active.
    pub fn has_custom_species_list(&self) -> bool {
        self.custom_species_list.is_some()
    }

    /// File the custom species list was loaded from, if any.
    pub fn custom_species_list_path(&self) -> Option<&Path> {
        self.custom_species_list_path.as_deref()
    }

    /// Custom-trained classifier model path, if one was configured.
    pub fn classifier_model_path(&self) -> Option<&Path> {
        self.classifier_model_path.as_deref()
    }

    /// Custom-trained classifier labels path, if one was configured.
    pub fn classifier_labels_path(&self) -> Option<&Path> {
        self.classifier_labels_path.as_deref()
    }

    /// The occurrence predictor and its cache.
    pub fn occurrence_predictor(&self) -> &OccurrencePredictor {
        &self.predictor
    }

    /// Number of `(lat, lon, week)` queries held in the cache.
    pub fn cached_predictions(&self) -> usize {
        self.predictor.cached_len()
    }

    /// Species predicted for a location and week, computed once per key.
    pub fn return_predicted_species_list(
        &self,
        latitude: f64,
        longitude: f64,
        week: u32,
    ) -> Result<Arc<PredictedSpecies>> {
        self.predictor.predict(latitude, longitude, week)
    }

    /// Turn a validated plan into the filter used for aggregation.
    pub fn resolve_species_filter(&self, plan: FilterPlan) -> Result<SpeciesFilter> {
        match plan {
            FilterPlan::Custom => {
                let species = self.custom_species_set.clone().ok_or_else(|| {
                    Error::AnalyzerConfiguration {
                        message: "custom species filter requested but no custom species list is configured"
                            .to_string(),
                    }
                })?;
                Ok(SpeciesFilter::Custom(species))
            }
            FilterPlan::Predicted {
                latitude,
                longitude,
                week,
            } => {
                let species = self.return_predicted_species_list(latitude, longitude, week)?;
                Ok(SpeciesFilter::Predicted {
                    key: OccurrenceKey::new(latitude, longitude, week),
                    species,
                })
            }
            FilterPlan::Unrestricted => Ok(SpeciesFilter::Unrestricted),
        }
    }
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("sample_rate", &self.classifier.sample_rate())
            .field("window_duration", &self.classifier.window_duration())
            .field(
                "custom_species_list",
                &self.custom_species_list.as_ref().map(Vec::len),
            )
            .field("custom_species_list_path", &self.custom_species_list_path)
            .field("classifier_model_path", &self.classifier_model_path)
            .field("classifier_labels_path", &self.classifier_labels_path)
            .field("predictor", &self.predictor)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Analyzer`].
///
/// Options are validated in [`AnalyzerBuilder::build`] before any model is
/// loaded, so configuration mistakes fail fast.
pub struct AnalyzerBuilder {
    classifier: Option<Box<dyn Classify>>,
    occurrence_model: Option<Box<dyn OccurrenceModel>>,
    decoder: Option<Box<dyn AudioDecoder>>,
    model: Option<ModelConfig>,
    classifier_model_path: Option<PathBuf>,
    classifier_labels_path: Option<PathBuf>,
    custom_species_list: Option<Vec<String>>,
    custom_species_list_path: Option<PathBuf>,
    relevance_floor: f32,
    device: InferenceDevice,
    top_k: Option<usize>,
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self {
            classifier: None,
            occurrence_model: None,
            decoder: None,
            model: None,
            classifier_model_path: None,
            classifier_labels_path: None,
            custom_species_list: None,
            custom_species_list_path: None,
            relevance_floor: DEFAULT_RELEVANCE_FLOOR,
            device: InferenceDevice::default(),
            top_k: None,
        }
    }
}

impl AnalyzerBuilder {
    /// Use an already constructed classifier.
    #[must_use]
    pub fn classifier(mut self, classifier: impl Classify + 'static) -> Self {
        self.classifier = Some(Box::new(classifier));
        self
    }

    /// Use an already constructed occurrence model.
    #[must_use]
    pub fn occurrence_model(mut self, model: impl OccurrenceModel + 'static) -> Self {
        self.occurrence_model = Some(Box::new(model));
        self
    }

    /// Use a custom audio decoder instead of symphonia.
    #[must_use]
    pub fn decoder(mut self, decoder: impl AudioDecoder + 'static) -> Self {
        self.decoder = Some(Box::new(decoder));
        self
    }

    /// Default model files, used when no custom-trained classifier is given.
    #[must_use]
    pub fn model(mut self, model: ModelConfig) -> Self {
        self.model = Some(model);
        self
    }

    /// Custom-trained classifier model. Requires [`Self::classifier_labels_path`].
    #[must_use]
    pub fn classifier_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.classifier_model_path = Some(path.into());
        self
    }

    /// Custom-trained classifier labels. Requires [`Self::classifier_model_path`].
    #[must_use]
    pub fn classifier_labels_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.classifier_labels_path = Some(path.into());
        self
    }

    /// Restrict detections to these `Scientific_Common` labels.
    #[must_use]
    pub fn custom_species_list<I, S>(mut self, species: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_species_list = Some(species.into_iter().map(Into::into).collect());
        self
    }

    /// Load the custom species list from a file.
    #[must_use]
    pub fn custom_species_list_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.custom_species_list_path = Some(path.into());
        self
    }

    /// Minimum relevance for a species to count as predicted.
    #[must_use]
    pub fn relevance_floor(mut self, floor: f32) -> Self {
        self.relevance_floor = floor;
        self
    }

    /// Inference device for ONNX models.
    #[must_use]
    pub fn device(mut self, device: InferenceDevice) -> Self {
        self.device = device;
        self
    }

    /// Keep at most `top_k` scores per window when every detection is
    /// requested. Unlimited by default.
    #[must_use]
    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    /// Check option combinations without loading anything.
    pub fn validate(&self) -> Result<()> {
        if self.classifier_model_path.is_some() != self.classifier_labels_path.is_some() {
            return Err(Error::AnalyzerConfiguration {
                message: CUSTOM_CLASSIFIER_PATHS_MESSAGE.to_string(),
            });
        }

        if self.custom_species_list.is_some() && self.custom_species_list_path.is_some() {
            return Err(Error::AnalyzerConfiguration {
                message: "custom_species_list and custom_species_list_path are mutually exclusive"
                    .to_string(),
            });
        }

        if !(0.0..=1.0).contains(&self.relevance_floor) {
            return Err(Error::AnalyzerConfiguration {
                message: format!(
                    "relevance floor must be between 0.0 and 1.0, got {}",
                    self.relevance_floor
                ),
            });
        }

        if self.top_k == Some(0) {
            return Err(Error::AnalyzerConfiguration {
                message: "top_k must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// Validate, load models and species list, and build the analyzer.
    pub fn build(self) -> Result<Analyzer> {
        self.validate()?;

        let custom_species_list = match (&self.custom_species_list, &self.custom_species_list_path)
        {
            (Some(list), None) => Some(list.clone()),
            (None, Some(path)) => {
                let list = read_species_list(path)?;
                info!(
                    "Loaded {} species from custom list {}",
                    list.len(),
                    path.display()
                );
                Some(list)
            }
            _ => None,
        };

        let custom_classifier = self
            .classifier_model_path
            .as_deref()
            .zip(self.classifier_labels_path.as_deref());

        let mut labels = None;
        let classifier: Box<dyn Classify> = match (self.classifier, custom_classifier, &self.model)
        {
            (Some(classifier), _, _) => classifier,
            (None, Some((model_path, labels_path)), _) => {
                info!("Using custom-trained classifier: {}", model_path.display());
                let onnx = OnnxClassifier::load(model_path, labels_path, self.device)?;
                labels = Some(onnx.labels().to_vec());
                Box::new(onnx)
            }
            (None, None, Some(model)) => {
                let onnx = OnnxClassifier::load(&model.path, &model.labels, self.device)?;
                labels = Some(onnx.labels().to_vec());
                Box::new(onnx)
            }
            (None, None, None) => {
                return Err(Error::AnalyzerConfiguration {
                    message: "no classifier configured (set a model in the config file or pass classifier_model_path and classifier_labels_path)"
                        .to_string(),
                });
            }
        };

        let meta_model = self.model.as_ref().and_then(|m| m.meta_model.as_deref());
        let occurrence_model: Option<Box<dyn OccurrenceModel>> =
            match (self.occurrence_model, meta_model, &labels) {
                (Some(model), _, _) => Some(model),
                (None, Some(meta_path), Some(labels)) => {
                    Some(Box::new(OnnxOccurrenceModel::load(meta_path, labels)?))
                }
                _ => None,
            };

        info!(
            "Analyzer ready: window {:.1}s at {} Hz, {}, location filtering {}",
            classifier.window_duration(),
            classifier.sample_rate(),
            custom_species_list.as_ref().map_or_else(
                || "no custom species list".to_string(),
                |list| format!("{} custom species", list.len())
            ),
            if occurrence_model.is_some() {
                "available"
            } else {
                "unavailable"
            }
        );

        let custom_species_set = custom_species_list
            .as_ref()
            .map(|list| Arc::new(list.iter().cloned().collect::<HashSet<_>>()));

        Ok(Analyzer {
            classifier,
            decoder: self
                .decoder
                .unwrap_or_else(|| Box::new(SymphoniaDecoder)),
            predictor: OccurrencePredictor::new(occurrence_model, self.relevance_floor),
            custom_species_list,
            custom_species_set,
            custom_species_list_path: self.custom_species_list_path,
            classifier_model_path: self.classifier_model_path,
            classifier_labels_path: self.classifier_labels_path,
            return_all_top_k: self.top_k,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::inference::SpeciesScore;

    struct Silent;

    impl Classify for Silent {
        fn sample_rate(&self) -> u32 {
            48_000
        }

        fn window_duration(&self) -> f32 {
            3.0
        }

        fn classify(&self, _window: &[f32]) -> Result<Vec<SpeciesScore>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_model_path_without_labels_is_rejected() {
        let err = Analyzer::builder()
            .classifier_model_path("/some/path/")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::AnalyzerConfiguration { .. }));
        assert_eq!(err.to_string(), CUSTOM_CLASSIFIER_PATHS_MESSAGE);
    }

    #[test]
    fn test_labels_path_without_model_is_rejected() {
        let err = Analyzer::builder()
            .classifier_labels_path("/some/path/")
            .build()
            .unwrap_err();
        assert_eq!(err.to_string(), CUSTOM_CLASSIFIER_PATHS_MESSAGE);
    }

    #[test]
    fn test_list_and_path_are_exclusive() {
        let result = Analyzer::builder()
            .classifier(Silent)
            .custom_species_list(["Corvus corax_Common Raven"])
            .custom_species_list_path("species_list.txt")
            .build();
        assert!(matches!(result, Err(Error::AnalyzerConfiguration { .. })));
    }

    #[test]
    fn test_relevance_floor_bounds() {
        let result = Analyzer::builder()
            .classifier(Silent)
            .relevance_floor(1.5)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_classifier_is_rejected() {
        let result = Analyzer::builder().build();
        assert!(matches!(result, Err(Error::AnalyzerConfiguration { .. })));
    }

    #[test]
    fn test_in_memory_custom_list() {
        let analyzer = Analyzer::builder()
            .classifier(Silent)
            .custom_species_list(["Corvus corax_Common Raven", "Columba livia_Rock Pigeon"])
            .build()
            .unwrap();

        assert!(analyzer.has_custom_species_list());
        assert_eq!(analyzer.custom_species_list().unwrap().len(), 2);

        let filter = analyzer.resolve_species_filter(FilterPlan::Custom).unwrap();
        assert!(filter.allows("Columba livia_Rock Pigeon"));
    }

    #[test]
    fn test_predicted_plan_without_model_fails() {
        let analyzer = Analyzer::builder().classifier(Silent).build().unwrap();
        let result = analyzer.resolve_species_filter(FilterPlan::Predicted {
            latitude: 35.4244,
            longitude: -120.7463,
            week: 18,
        });
        assert!(matches!(result, Err(Error::OccurrenceModelMissing)));
    }

    #[test]
    fn test_custom_plan_without_list_fails() {
        let analyzer = Analyzer::builder().classifier(Silent).build().unwrap();
        assert!(analyzer.resolve_species_filter(FilterPlan::Custom).is_err());
        assert!(matches!(
            analyzer.resolve_species_filter(FilterPlan::Unrestricted),
            Ok(SpeciesFilter::Unrestricted)
        ));
    }
}
