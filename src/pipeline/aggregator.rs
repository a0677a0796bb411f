//! Turns classifier scores into the detection sequence.

use crate::audio::AudioWindow;
use crate::error::Result;
use crate::inference::{Classify, SpeciesScore};
use crate::output::Detection;
use crate::species::SpeciesFilter;
use tracing::{debug, trace};

/// Filtering knobs for one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregationOptions {
    /// Scores below this are dropped unless `return_all_detections` is set.
    pub min_conf: f32,
    /// Keep every score regardless of threshold and species filter.
    pub return_all_detections: bool,
    /// With `return_all_detections`, keep at most this many of the
    /// highest-scoring species per window. Species named by an active
    /// filter are always kept.
    pub return_all_top_k: Option<usize>,
}

/// Classify each window and collect the surviving detections.
///
/// Windows are not merged: overlapping windows each contribute their own
/// detections. Output is ordered by window start time, then by the order the
/// classifier reported species within the window. Non-finite scores are
/// dropped. The first classifier error aborts the run with no partial result.
pub fn aggregate_detections(
    windows: &[AudioWindow],
    classifier: &dyn Classify,
    filter: &SpeciesFilter,
    options: AggregationOptions,
) -> Result<Vec<Detection>> {
    let mut detections = Vec::new();
    let mut dropped_by_filter = 0_usize;
    let mut dropped_by_confidence = 0_usize;
    let mut dropped_non_finite = 0_usize;
    let mut dropped_by_rank = 0_usize;

    for window in windows {
        let mut scores = classifier.classify(&window.samples)?;
        trace!(
            "{:.1}-{:.1}s: {} scores",
            window.start_time,
            window.end_time,
            scores.len()
        );

        let before = scores.len();
        scores.retain(|s| s.score.is_finite());
        dropped_non_finite += before - scores.len();

        let ranked = if options.return_all_detections {
            top_ranked(&scores, options.return_all_top_k)
        } else {
            Vec::new()
        };

        for (i, score) in scores.iter().enumerate() {
            if options.return_all_detections {
                if !ranked[i] && !filter.lists(&score.label) {
                    dropped_by_rank += 1;
                    continue;
                }
            } else {
                if !filter.allows(&score.label) {
                    dropped_by_filter += 1;
                    continue;
                }
                if score.score < options.min_conf {
                    dropped_by_confidence += 1;
                    continue;
                }
            }

            detections.push(Detection::from_label(
                &score.label,
                score.score,
                window.start_time,
                window.end_time,
                filter.is_predicted(&score.label),
            ));
        }
    }

    // Stable, so ties keep classification order.
    detections.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    debug!(
        "{} windows -> {} detections ({} outside {} species filter, {} below {:.2}, {} beyond top_k, {} non-finite)",
        windows.len(),
        detections.len(),
        dropped_by_filter,
        filter.mode(),
        dropped_by_confidence,
        options.min_conf,
        dropped_by_rank,
        dropped_non_finite
    );

    Ok(detections)
}

/// Mark the `limit` highest scores; everything is marked without a limit.
fn top_ranked(scores: &[SpeciesScore], limit: Option<usize>) -> Vec<bool> {
    let Some(limit) = limit.filter(|&k| k < scores.len()) else {
        return vec![true; scores.len()];
    };

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[b].score.total_cmp(&scores[a].score));

    let mut keep = vec![false; scores.len()];
    for &i in &order[..limit] {
        keep[i] = true;
    }
    keep
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::inference::check_window_len;
    use std::collections::HashSet;
    use std::sync::Arc;

    /// Scores keyed on the first sample of each window.
    struct ScriptedClassifier;

    impl Classify for ScriptedClassifier {
        fn sample_rate(&self) -> u32 {
            10
        }

        fn window_duration(&self) -> f32 {
            3.0
        }

        fn classify(&self, window: &[f32]) -> Result<Vec<SpeciesScore>> {
            check_window_len(self.window_len(), window)?;
            Ok(match window[0] {
                x if x < 0.5 => vec![
                    SpeciesScore::new("Corvus corax_Common Raven", 0.8),
                    SpeciesScore::new("Columba livia_Rock Pigeon", 0.2),
                ],
                _ => vec![
                    SpeciesScore::new("Zenaida macroura_Mourning Dove", 0.4),
                    SpeciesScore::new("Corvus corax_Common Raven", 0.3),
                ],
            })
        }
    }

    fn window(start: f32, marker: f32) -> AudioWindow {
        let mut samples = vec![0.0; 30];
        samples[0] = marker;
        AudioWindow {
            samples,
            start_time: start,
            end_time: start + 3.0,
        }
    }

    fn options(min_conf: f32, return_all_detections: bool) -> AggregationOptions {
        AggregationOptions {
            min_conf,
            return_all_detections,
            return_all_top_k: None,
        }
    }

    fn custom(labels: &[&str]) -> SpeciesFilter {
        let set: HashSet<String> = labels.iter().map(ToString::to_string).collect();
        SpeciesFilter::Custom(Arc::new(set))
    }

    #[test]
    fn test_unrestricted_applies_threshold() {
        let windows = [window(0.0, 0.0), window(3.0, 1.0)];
        let detections = aggregate_detections(
            &windows,
            &ScriptedClassifier,
            &SpeciesFilter::Unrestricted,
            options(0.25, false),
        )
        .unwrap();

        let labels: Vec<&str> = detections.iter().map(|d| d.common_name.as_str()).collect();
        assert_eq!(labels, vec!["Common Raven", "Mourning Dove", "Common Raven"]);
        assert!(detections.iter().all(|d| !d.is_predicted_for_location_and_date));
        assert_eq!(detections[1].start_time, 3.0);
        assert_eq!(detections[1].end_time, 6.0);
    }

    #[test]
    fn test_custom_filter_drops_unlisted_species() {
        let windows = [window(0.0, 0.0), window(3.0, 1.0)];
        let detections = aggregate_detections(
            &windows,
            &ScriptedClassifier,
            &custom(&["Zenaida macroura_Mourning Dove"]),
            options(0.1, false),
        )
        .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].label, "Zenaida macroura_Mourning Dove");
        assert!(!detections[0].is_predicted_for_location_and_date);
    }

    #[test]
    fn test_return_all_keeps_everything() {
        let windows = [window(0.0, 0.0), window(3.0, 1.0)];
        let detections = aggregate_detections(
            &windows,
            &ScriptedClassifier,
            &custom(&["Zenaida macroura_Mourning Dove"]),
            options(0.9, true),
        )
        .unwrap();

        assert_eq!(detections.len(), 4);
        assert_eq!(detections[1].confidence, 0.2);
    }

    /// Eleven loud unlisted species ahead of one quiet listed one.
    struct CrowdedClassifier;

    impl Classify for CrowdedClassifier {
        fn sample_rate(&self) -> u32 {
            10
        }

        fn window_duration(&self) -> f32 {
            3.0
        }

        fn classify(&self, _window: &[f32]) -> Result<Vec<SpeciesScore>> {
            let mut scores: Vec<SpeciesScore> = (0..11_u8)
                .map(|i| {
                    SpeciesScore::new(
                        format!("Decoy species{i}_Decoy {i}"),
                        0.9 - f32::from(i) * 0.01,
                    )
                })
                .collect();
            scores.push(SpeciesScore::new("Sitta carolinensis_White-breasted Nuthatch", 0.26));
            Ok(scores)
        }
    }

    #[test]
    fn test_low_ranked_listed_species_is_detected() {
        let detections = aggregate_detections(
            &[window(0.0, 0.0)],
            &CrowdedClassifier,
            &custom(&["Sitta carolinensis_White-breasted Nuthatch"]),
            options(0.25, false),
        )
        .unwrap();

        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].common_name, "White-breasted Nuthatch");
    }

    #[test]
    fn test_return_all_cap_keeps_listed_species() {
        let capped = AggregationOptions {
            return_all_top_k: Some(2),
            ..options(0.9, true)
        };
        let detections = aggregate_detections(
            &[window(0.0, 0.0)],
            &CrowdedClassifier,
            &custom(&["Sitta carolinensis_White-breasted Nuthatch"]),
            capped,
        )
        .unwrap();

        let names: Vec<&str> = detections.iter().map(|d| d.common_name.as_str()).collect();
        assert_eq!(names, vec!["Decoy 0", "Decoy 1", "White-breasted Nuthatch"]);

        let unrestricted = aggregate_detections(
            &[window(0.0, 0.0)],
            &CrowdedClassifier,
            &SpeciesFilter::Unrestricted,
            capped,
        )
        .unwrap();
        assert_eq!(unrestricted.len(), 2);
    }

    struct NanClassifier;

    impl Classify for NanClassifier {
        fn sample_rate(&self) -> u32 {
            10
        }

        fn window_duration(&self) -> f32 {
            3.0
        }

        fn classify(&self, _window: &[f32]) -> Result<Vec<SpeciesScore>> {
            Ok(vec![
                SpeciesScore::new("Corvus corax_Common Raven", f32::NAN),
                SpeciesScore::new("Columba livia_Rock Pigeon", f32::INFINITY),
                SpeciesScore::new("Zenaida macroura_Mourning Dove", 0.5),
            ])
        }
    }

    #[test]
    fn test_non_finite_scores_are_dropped() {
        for return_all in [false, true] {
            let detections = aggregate_detections(
                &[window(0.0, 0.0)],
                &NanClassifier,
                &SpeciesFilter::Unrestricted,
                options(0.1, return_all),
            )
            .unwrap();

            assert_eq!(detections.len(), 1);
            assert_eq!(detections[0].common_name, "Mourning Dove");
            assert!((0.0..=1.0).contains(&detections[0].confidence));
        }
    }

    #[test]
    fn test_overlapping_windows_are_not_merged() {
        let windows = [window(0.0, 0.0), window(1.5, 0.0), window(3.0, 0.0)];
        let detections = aggregate_detections(
            &windows,
            &ScriptedClassifier,
            &SpeciesFilter::Unrestricted,
            options(0.5, false),
        )
        .unwrap();

        let starts: Vec<f32> = detections.iter().map(|d| d.start_time).collect();
        assert_eq!(starts, vec![0.0, 1.5, 3.0]);
    }

    #[test]
    fn test_output_sorted_by_start_time() {
        let windows = [window(3.0, 1.0), window(0.0, 0.0)];
        let detections = aggregate_detections(
            &windows,
            &ScriptedClassifier,
            &SpeciesFilter::Unrestricted,
            options(0.25, false),
        )
        .unwrap();

        let names: Vec<&str> = detections.iter().map(|d| d.common_name.as_str()).collect();
        assert_eq!(names, vec!["Common Raven", "Mourning Dove", "Common Raven"]);
        assert_eq!(detections[0].start_time, 0.0);
    }

    #[test]
    fn test_shape_error_aborts() {
        let bad = AudioWindow {
            samples: vec![0.0; 7],
            start_time: 0.0,
            end_time: 3.0,
        };
        let result = aggregate_detections(
            &[window(0.0, 0.0), bad],
            &ScriptedClassifier,
            &SpeciesFilter::Unrestricted,
            options(0.1, false),
        );
        assert!(matches!(result, Err(Error::WindowShape { .. })));
    }
}
