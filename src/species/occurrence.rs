//! Species occurrence prediction with a per-analyzer cache.
//!
//! An [`OccurrenceModel`] scores how plausible each known species is at a
//! place and week of the year. [`OccurrencePredictor`] keeps the species above
//! the relevance floor and memoises the result per `(lat, lon, week)` so that
//! recordings sharing a location and week pay for the model once.

use crate::error::{Error, Result};
use crate::species::SpeciesLabel;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Relevance of one species at a location and week.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesOccurrence {
    /// Scientific name.
    pub scientific_name: String,
    /// Common name.
    pub common_name: String,
    /// Model-derived relevance score (0.0 - 1.0).
    pub relevance: f32,
}

impl SpeciesOccurrence {
    /// Build an entry from a `Scientific_Common` label.
    pub fn from_label(label: &str, relevance: f32) -> Self {
        let SpeciesLabel {
            scientific_name,
            common_name,
        } = SpeciesLabel::parse(label);

        Self {
            scientific_name,
            common_name,
            relevance,
        }
    }

    /// The joined `{scientific}_{common}` label.
    pub fn label(&self) -> String {
        format!("{}_{}", self.scientific_name, self.common_name)
    }
}

/// Location/season relevance model.
///
/// Implementations return a score for every species they know about; the
/// predictor applies the relevance floor.
pub trait OccurrenceModel: Send + Sync {
    /// Score all known species for the given coordinates and week (1-48).
    fn relevance(&self, latitude: f64, longitude: f64, week: u32)
    -> Result<Vec<SpeciesOccurrence>>;
}

/// Cache key: the exact `(lat, lon, week)` query.
///
/// Coordinates are compared by bit pattern, so `35.4244` and `35.42440001`
/// are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OccurrenceKey {
    latitude: u64,
    longitude: u64,
    week: u32,
}

impl OccurrenceKey {
    /// Create a key for a query.
    pub fn new(latitude: f64, longitude: f64, week: u32) -> Self {
        Self {
            latitude: latitude.to_bits(),
            longitude: longitude.to_bits(),
            week,
        }
    }

    /// Latitude of the query.
    pub fn latitude(&self) -> f64 {
        f64::from_bits(self.latitude)
    }

    /// Longitude of the query.
    pub fn longitude(&self) -> f64 {
        f64::from_bits(self.longitude)
    }

    /// Week of the query (1-48).
    pub fn week(&self) -> u32 {
        self.week
    }
}

/// Species predicted for one location and week, most relevant first.
#[derive(Debug, Clone)]
pub struct PredictedSpecies {
    entries: Vec<SpeciesOccurrence>,
    labels: HashSet<String>,
}

impl PredictedSpecies {
    fn from_scores(mut scores: Vec<SpeciesOccurrence>, relevance_floor: f32) -> Self {
        scores.retain(|entry| entry.relevance >= relevance_floor);
        scores.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        let labels = scores.iter().map(SpeciesOccurrence::label).collect();

        Self {
            entries: scores,
            labels,
        }
    }

    /// Whether a `Scientific_Common` label is in the set.
    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Number of predicted species.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no species passed the relevance floor.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ordered by descending relevance.
    pub fn entries(&self) -> &[SpeciesOccurrence] {
        &self.entries
    }

    /// Labels ordered by descending relevance.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(SpeciesOccurrence::label).collect()
    }
}

/// Cached front end to an [`OccurrenceModel`].
pub struct OccurrencePredictor {
    model: Option<Box<dyn OccurrenceModel>>,
    relevance_floor: f32,
    cache: Mutex<HashMap<OccurrenceKey, Arc<PredictedSpecies>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl OccurrencePredictor {
    /// Create a predictor. `model` may be absent when location filtering is not available.
    pub fn new(model: Option<Box<dyn OccurrenceModel>>, relevance_floor: f32) -> Self {
        Self {
            model,
            relevance_floor,
            cache: Mutex::new(HashMap::new()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Whether an occurrence model is loaded.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Relevance floor used for set membership.
    pub fn relevance_floor(&self) -> f32 {
        self.relevance_floor
    }

    /// Species plausible at `(latitude, longitude)` in `week`.
    ///
    /// The model runs at most once per distinct key. The lock is held across
    /// the model call so concurrent callers with the same key wait for the
    /// first result instead of computing it again.
    pub fn predict(&self, latitude: f64, longitude: f64, week: u32) -> Result<Arc<PredictedSpecies>> {
        let key = OccurrenceKey::new(latitude, longitude, week);
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(species) = cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(
                "Occurrence cache hit: lat={latitude:.4}, lon={longitude:.4}, week={week} ({} species)",
                species.len()
            );
            return Ok(Arc::clone(species));
        }

        let model = self.model.as_ref().ok_or(Error::OccurrenceModelMissing)?;
        let scores = model.relevance(latitude, longitude, week)?;
        let total = scores.len();
        let species = Arc::new(PredictedSpecies::from_scores(scores, self.relevance_floor));
        self.misses.fetch_add(1, Ordering::Relaxed);

        info!(
            "Predicted {} of {} species for lat={:.4}, lon={:.4}, week={} (relevance >= {:.3})",
            species.len(),
            total,
            latitude,
            longitude,
            week,
            self.relevance_floor
        );

        cache.insert(key, Arc::clone(&species));
        Ok(species)
    }

    /// Number of cached queries.
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Queries answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Queries that ran the model.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for OccurrencePredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OccurrencePredictor")
            .field("has_model", &self.has_model())
            .field("relevance_floor", &self.relevance_floor)
            .field("cached", &self.cached_len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    struct CountingModel {
        calls: Arc<AtomicUsize>,
    }

    impl OccurrenceModel for CountingModel {
        fn relevance(&self, latitude: f64, _longitude: f64, week: u32) -> Result<Vec<SpeciesOccurrence>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let spring = if week >= 12 { 0.6 } else { 0.01 };
            Ok(vec![
                SpeciesOccurrence::from_label("Turdus migratorius_American Robin", 0.9),
                SpeciesOccurrence::from_label("Junco hyemalis_Dark-eyed Junco", 0.02),
                SpeciesOccurrence::from_label("Setophaga coronata_Yellow-rumped Warbler", spring),
                SpeciesOccurrence::from_label(
                    "Haliaeetus leucocephalus_Bald Eagle",
                    if latitude > 40.0 { 0.5 } else { 0.0 },
                ),
            ])
        }
    }

    fn predictor(floor: f32) -> (OccurrencePredictor, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let model = CountingModel {
            calls: Arc::clone(&calls),
        };
        (OccurrencePredictor::new(Some(Box::new(model)), floor), calls)
    }

    #[test]
    fn test_predict_applies_relevance_floor() {
        let (predictor, _) = predictor(0.03);
        let species = predictor.predict(35.4244, -120.7463, 18).unwrap();

        assert_eq!(species.len(), 2);
        assert!(species.contains("Turdus migratorius_American Robin"));
        assert!(species.contains("Setophaga coronata_Yellow-rumped Warbler"));
        assert!(!species.contains("Junco hyemalis_Dark-eyed Junco"));
        assert_eq!(species.entries()[0].relevance, 0.9);
    }

    #[test]
    fn test_floor_is_tunable() {
        let (predictor, _) = predictor(0.0);
        let species = predictor.predict(35.4244, -120.7463, 18).unwrap();
        assert_eq!(species.len(), 4);
    }

    #[test]
    fn test_repeated_query_uses_cache() {
        let (predictor, calls) = predictor(0.03);

        let first = predictor.predict(35.4244, -120.7463, 18).unwrap();
        let second = predictor.predict(35.4244, -120.7463, 18).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(predictor.hits(), 1);
        assert_eq!(predictor.misses(), 1);
        assert_eq!(predictor.cached_len(), 1);
    }

    #[test]
    fn test_distinct_keys_are_computed_separately() {
        let (predictor, calls) = predictor(0.03);

        let spring = predictor.predict(35.4244, -120.7463, 18).unwrap();
        let winter = predictor.predict(35.4244, -120.7463, 2).unwrap();
        let north = predictor.predict(45.0, -120.7463, 18).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(spring.contains("Setophaga coronata_Yellow-rumped Warbler"));
        assert!(!winter.contains("Setophaga coronata_Yellow-rumped Warbler"));
        assert!(north.contains("Haliaeetus leucocephalus_Bald Eagle"));
        assert_eq!(predictor.cached_len(), 3);
    }

    #[test]
    fn test_concurrent_queries_compute_once() {
        let (predictor, calls) = predictor(0.03);
        let predictor = Arc::new(predictor);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let predictor = Arc::clone(&predictor);
                std::thread::spawn(move || predictor.predict(35.4244, -120.7463, 18).unwrap().len())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_model_errors() {
        let predictor = OccurrencePredictor::new(None, 0.03);
        let result = predictor.predict(35.4244, -120.7463, 18);
        assert!(matches!(result, Err(Error::OccurrenceModelMissing)));
        assert_eq!(predictor.cached_len(), 0);
    }

    #[test]
    fn test_key_round_trips_coordinates() {
        let key = OccurrenceKey::new(35.4244, -120.7463, 18);
        assert_eq!(key.latitude(), 35.4244);
        assert_eq!(key.longitude(), -120.7463);
        assert_eq!(key.week(), 18);
    }
}
