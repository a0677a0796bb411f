//! Species filter mode selection.
//!
//! Resolution happens in two steps. [`plan_species_filter`] is a pure
//! pre-flight check over the recording parameters that either rejects the
//! combination with a specific [`ValidationError`] or returns a
//! [`FilterPlan`]. The analyzer then turns the plan into a
//! [`SpeciesFilter`], running the occurrence predictor when needed.

use crate::error::ValidationError;
use crate::recording::RecordingOptions;
use crate::species::{OccurrenceKey, PredictedSpecies};
use crate::utils::date::{current_week, is_valid_week, week_of};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Which species restriction applies to a recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// The analyzer's custom species list.
    Custom,
    /// Species predicted for the recording's location and week.
    Predicted,
    /// Every species the classifier can emit.
    Unrestricted,
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom => write!(f, "custom"),
            Self::Predicted => write!(f, "predicted"),
            Self::Unrestricted => write!(f, "unrestricted"),
        }
    }
}

/// Outcome of the pre-flight check: the filter to build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterPlan {
    /// Use the analyzer's custom species list.
    Custom,
    /// Predict species for this location and week.
    Predicted {
        /// Latitude.
        latitude: f64,
        /// Longitude.
        longitude: f64,
        /// Week (1-48).
        week: u32,
    },
    /// No restriction.
    Unrestricted,
}

impl FilterPlan {
    /// Mode this plan resolves to.
    pub fn mode(&self) -> FilterMode {
        match self {
            Self::Custom => FilterMode::Custom,
            Self::Predicted { .. } => FilterMode::Predicted,
            Self::Unrestricted => FilterMode::Unrestricted,
        }
    }
}

/// Check recording parameters and pick the filter mode.
///
/// `has_custom_list` is whether the analyzer carries a custom species list.
/// `window_duration` is the classifier's window length in seconds, used to
/// bound the overlap.
pub fn plan_species_filter(
    options: &RecordingOptions,
    has_custom_list: bool,
    window_duration: f32,
) -> Result<FilterPlan, ValidationError> {
    if !(0.0..=1.0).contains(&options.min_conf) {
        return Err(ValidationError::InvalidConfidence {
            value: options.min_conf,
        });
    }

    if !(0.0..window_duration).contains(&options.overlap) {
        return Err(ValidationError::InvalidOverlap {
            value: options.overlap,
            window: window_duration,
        });
    }

    if let Some(week) = options.week {
        if options.date.is_some() {
            return Err(ValidationError::WeekAndDate);
        }
        if !is_valid_week(week) {
            return Err(ValidationError::WeekOutOfRange { value: week });
        }
    }

    let (latitude, longitude) = match (options.latitude, options.longitude) {
        (Some(latitude), Some(longitude)) => (latitude, longitude),
        (None, None) => {
            return Ok(if has_custom_list {
                FilterPlan::Custom
            } else {
                FilterPlan::Unrestricted
            });
        }
        (lat, lon) => return Err(ValidationError::UnpairedCoordinates { lat, lon }),
    };

    if has_custom_list {
        return Err(ValidationError::LocationWithCustomSpeciesList);
    }

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(ValidationError::InvalidLatitude { value: latitude });
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(ValidationError::InvalidLongitude { value: longitude });
    }

    let week = options
        .week
        .or_else(|| options.date.map(week_of))
        .unwrap_or_else(current_week);

    Ok(FilterPlan::Predicted {
        latitude,
        longitude,
        week,
    })
}

/// The species restriction in force for one analysis run.
#[derive(Debug, Clone)]
pub enum SpeciesFilter {
    /// Only labels in the custom list are eligible.
    Custom(Arc<HashSet<String>>),
    /// Only labels predicted for the location and week are eligible.
    Predicted {
        /// The query the set was predicted for.
        key: OccurrenceKey,
        /// The predicted set.
        species: Arc<PredictedSpecies>,
    },
    /// Every label is eligible.
    Unrestricted,
}

impl SpeciesFilter {
    /// Active filter mode.
    pub fn mode(&self) -> FilterMode {
        match self {
            Self::Custom(_) => FilterMode::Custom,
            Self::Predicted { .. } => FilterMode::Predicted,
            Self::Unrestricted => FilterMode::Unrestricted,
        }
    }

    /// Whether a label passes the filter.
    pub fn allows(&self, label: &str) -> bool {
        match self {
            Self::Custom(species) => species.contains(label),
            Self::Predicted { species, .. } => species.contains(label),
            Self::Unrestricted => true,
        }
    }

    /// Whether a label is named by an active custom or predicted set.
    ///
    /// Always false when unrestricted.
    pub fn lists(&self, label: &str) -> bool {
        match self {
            Self::Custom(species) => species.contains(label),
            Self::Predicted { species, .. } => species.contains(label),
            Self::Unrestricted => false,
        }
    }

    /// Whether a label is in the location/date-predicted set.
    ///
    /// Always false outside [`FilterMode::Predicted`].
    pub fn is_predicted(&self, label: &str) -> bool {
        match self {
            Self::Predicted { species, .. } => species.contains(label),
            Self::Custom(_) | Self::Unrestricted => false,
        }
    }

    /// Size of the active species set, `None` when unrestricted.
    pub fn species_count(&self) -> Option<usize> {
        match self {
            Self::Custom(species) => Some(species.len()),
            Self::Predicted { species, .. } => Some(species.len()),
            Self::Unrestricted => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const WINDOW: f32 = 3.0;

    fn located() -> RecordingOptions {
        RecordingOptions {
            latitude: Some(35.4244),
            longitude: Some(-120.7463),
            week: Some(18),
            ..RecordingOptions::default()
        }
    }

    #[test]
    fn test_plan_unrestricted_without_location() {
        let plan = plan_species_filter(&RecordingOptions::default(), false, WINDOW).unwrap();
        assert_eq!(plan, FilterPlan::Unrestricted);
    }

    #[test]
    fn test_plan_custom_without_location() {
        let options = RecordingOptions {
            week: Some(18),
            ..RecordingOptions::default()
        };
        let plan = plan_species_filter(&options, true, WINDOW).unwrap();
        assert_eq!(plan.mode(), FilterMode::Custom);
    }

    #[test]
    fn test_plan_predicted_with_location() {
        let plan = plan_species_filter(&located(), false, WINDOW).unwrap();
        assert_eq!(
            plan,
            FilterPlan::Predicted {
                latitude: 35.4244,
                longitude: -120.7463,
                week: 18
            }
        );
    }

    #[test]
    fn test_location_with_custom_list_rejected() {
        let result = plan_species_filter(&located(), true, WINDOW);
        assert_eq!(result, Err(ValidationError::LocationWithCustomSpeciesList));
    }

    #[test]
    fn test_unpaired_coordinates_rejected() {
        let options = RecordingOptions {
            latitude: Some(35.4244),
            ..RecordingOptions::default()
        };
        assert!(matches!(
            plan_species_filter(&options, false, WINDOW),
            Err(ValidationError::UnpairedCoordinates { lat: Some(_), lon: None })
        ));

        let options = RecordingOptions {
            longitude: Some(-120.7463),
            ..RecordingOptions::default()
        };
        assert!(matches!(
            plan_species_filter(&options, true, WINDOW),
            Err(ValidationError::UnpairedCoordinates { lat: None, lon: Some(_) })
        ));
    }

    #[test]
    fn test_week_out_of_range_rejected() {
        for week in [0, 49] {
            let options = RecordingOptions {
                week: Some(week),
                ..located()
            };
            assert_eq!(
                plan_species_filter(&options, false, WINDOW),
                Err(ValidationError::WeekOutOfRange { value: week })
            );
        }
    }

    #[test]
    fn test_week_checked_without_location() {
        let options = RecordingOptions {
            week: Some(60),
            ..RecordingOptions::default()
        };
        assert!(plan_species_filter(&options, false, WINDOW).is_err());
    }

    #[test]
    fn test_week_and_date_rejected() {
        let options = RecordingOptions {
            date: NaiveDate::from_ymd_opt(2022, 5, 10),
            ..located()
        };
        assert_eq!(
            plan_species_filter(&options, false, WINDOW),
            Err(ValidationError::WeekAndDate)
        );
    }

    #[test]
    fn test_date_sets_week() {
        let options = RecordingOptions {
            week: None,
            date: NaiveDate::from_ymd_opt(2022, 5, 10),
            ..located()
        };
        let plan = plan_species_filter(&options, false, WINDOW).unwrap();
        assert!(matches!(plan, FilterPlan::Predicted { week: 18, .. }));
    }

    #[test]
    fn test_missing_week_uses_current_date() {
        let options = RecordingOptions {
            week: None,
            ..located()
        };
        let plan = plan_species_filter(&options, false, WINDOW).unwrap();
        assert!(matches!(plan, FilterPlan::Predicted { week, .. } if week == current_week()));
    }

    #[test]
    fn test_coordinate_ranges() {
        let options = RecordingOptions {
            latitude: Some(91.0),
            ..located()
        };
        assert!(matches!(
            plan_species_filter(&options, false, WINDOW),
            Err(ValidationError::InvalidLatitude { .. })
        ));

        let options = RecordingOptions {
            longitude: Some(-181.0),
            ..located()
        };
        assert!(matches!(
            plan_species_filter(&options, false, WINDOW),
            Err(ValidationError::InvalidLongitude { .. })
        ));
    }

    #[test]
    fn test_confidence_and_overlap_bounds() {
        let options = RecordingOptions {
            min_conf: 1.5,
            ..RecordingOptions::default()
        };
        assert!(matches!(
            plan_species_filter(&options, false, WINDOW),
            Err(ValidationError::InvalidConfidence { .. })
        ));

        let options = RecordingOptions {
            overlap: 3.0,
            ..RecordingOptions::default()
        };
        assert!(matches!(
            plan_species_filter(&options, false, WINDOW),
            Err(ValidationError::InvalidOverlap { .. })
        ));

        let options = RecordingOptions {
            overlap: 1.5,
            ..RecordingOptions::default()
        };
        assert!(plan_species_filter(&options, false, WINDOW).is_ok());
    }

    #[test]
    fn test_custom_filter_membership() {
        let species: HashSet<String> = ["Corvus corax_Common Raven".to_string()].into_iter().collect();
        let filter = SpeciesFilter::Custom(Arc::new(species));

        assert_eq!(filter.mode(), FilterMode::Custom);
        assert!(filter.allows("Corvus corax_Common Raven"));
        assert!(!filter.allows("Columba livia_Rock Pigeon"));
        assert!(!filter.is_predicted("Corvus corax_Common Raven"));
        assert_eq!(filter.species_count(), Some(1));
    }

    #[test]
    fn test_unrestricted_filter_allows_everything() {
        let filter = SpeciesFilter::Unrestricted;
        assert!(filter.allows("Anything_At all"));
        assert!(!filter.is_predicted("Anything_At all"));
        assert_eq!(filter.species_count(), None);
    }
}
