//! A single audio file analyzed against a shared [`Analyzer`].

use crate::analyzer::Analyzer;
use crate::audio::{split_windows, window_stride};
use crate::constants::DEFAULT_MIN_CONFIDENCE;
use crate::error::{Error, Result, ValidationError};
use crate::output::Detection;
use crate::pipeline::{AggregationOptions, aggregate_detections};
use crate::species::{FilterMode, FilterPlan, SpeciesFilter, plan_species_filter};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Per-recording analysis parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingOptions {
    /// Recording latitude. Must be paired with `longitude`.
    pub latitude: Option<f64>,
    /// Recording longitude. Must be paired with `latitude`.
    pub longitude: Option<f64>,
    /// Week of year (1-48). Exclusive with `date`.
    pub week: Option<u32>,
    /// Recording date, converted to a week. Exclusive with `week`.
    pub date: Option<NaiveDate>,
    /// Minimum confidence for a detection to be kept.
    pub min_conf: f32,
    /// Window overlap in seconds.
    pub overlap: f32,
    /// Keep every score regardless of threshold and species filter.
    pub return_all_detections: bool,
}

impl Default for RecordingOptions {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            week: None,
            date: None,
            min_conf: DEFAULT_MIN_CONFIDENCE,
            overlap: 0.0,
            return_all_detections: false,
        }
    }
}

/// Lifecycle of a [`Recording`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Created, nothing checked yet.
    Constructed,
    /// Parameters passed the pre-flight check.
    Validated,
    /// Detections are available.
    Analyzed,
    /// The last validation or analysis failed.
    Failed,
}

/// An audio file plus the parameters it is analyzed with.
#[derive(Debug)]
pub struct Recording<'a> {
    analyzer: &'a Analyzer,
    path: PathBuf,
    options: RecordingOptions,
    state: RecordingState,
    plan: Option<FilterPlan>,
    species_filter: Option<SpeciesFilter>,
    duration: Option<f32>,
    detections: Vec<Detection>,
}

impl<'a> Recording<'a> {
    /// Create a recording bound to `analyzer`. Nothing is read yet.
    pub fn new(analyzer: &'a Analyzer, path: impl Into<PathBuf>, options: RecordingOptions) -> Self {
        Self {
            analyzer,
            path: path.into(),
            options,
            state: RecordingState::Constructed,
            plan: None,
            species_filter: None,
            duration: None,
            detections: Vec::new(),
        }
    }

    /// Run the pre-flight check without touching the audio.
    pub fn validate(&mut self) -> Result<FilterPlan> {
        let classifier = self.analyzer.classifier();
        let plan = plan_species_filter(
            &self.options,
            self.analyzer.has_custom_species_list(),
            classifier.window_duration(),
        )
        .and_then(|plan| {
            let stride = window_stride(
                classifier.sample_rate(),
                classifier.window_duration(),
                self.options.overlap,
            );
            if stride == 0 {
                Err(ValidationError::OverlapLeavesNoStride {
                    value: self.options.overlap,
                    sample_rate: classifier.sample_rate(),
                })
            } else {
                Ok(plan)
            }
        });

        match plan {
            Ok(plan) => {
                self.plan = Some(plan);
                if self.state != RecordingState::Analyzed {
                    self.state = RecordingState::Validated;
                }
                Ok(plan)
            }
            Err(e) => {
                self.plan = None;
                self.fail();
                Err(Error::Validation(e))
            }
        }
    }

    /// Decode, window and classify the file.
    ///
    /// On error the recording is left in [`RecordingState::Failed`] with no
    /// detections. Calling again re-runs the whole analysis.
    pub fn analyze(&mut self) -> Result<&[Detection]> {
        match self.run() {
            Ok((filter, duration, detections)) => {
                self.species_filter = Some(filter);
                self.duration = Some(duration);
                self.detections = detections;
                self.state = RecordingState::Analyzed;
                Ok(&self.detections)
            }
            Err(e) => {
                self.fail();
                Err(e)
            }
        }
    }

    fn run(&mut self) -> Result<(SpeciesFilter, f32, Vec<Detection>)> {
        let start = Instant::now();
        let plan = self.validate()?;
        let filter = self.analyzer.resolve_species_filter(plan)?;

        let classifier = self.analyzer.classifier();
        let audio = self
            .analyzer
            .decoder()
            .decode(&self.path, classifier.sample_rate())?;
        debug!(
            "Decoded {}: {:.1}s at {} Hz",
            self.path.display(),
            audio.duration_secs,
            audio.sample_rate
        );

        let windows = split_windows(
            &audio.samples,
            audio.sample_rate,
            classifier.window_duration(),
            self.options.overlap,
        );

        let detections = aggregate_detections(
            &windows,
            classifier,
            &filter,
            AggregationOptions {
                min_conf: self.options.min_conf,
                return_all_detections: self.options.return_all_detections,
                return_all_top_k: self.analyzer.return_all_top_k(),
            },
        )?;

        info!(
            "{}: {} detections in {} windows ({} filter) in {:.2}s",
            self.path.display(),
            detections.len(),
            windows.len(),
            filter.mode(),
            start.elapsed().as_secs_f64()
        );

        Ok((filter, audio.duration_secs, detections))
    }

    fn fail(&mut self) {
        self.state = RecordingState::Failed;
        self.detections.clear();
        self.species_filter = None;
        self.duration = None;
    }

    /// Detections from the last successful analysis, in start-time order.
    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Take the detections, leaving the recording empty.
    pub fn take_detections(&mut self) -> Vec<Detection> {
        std::mem::take(&mut self.detections)
    }

    /// Audio duration in seconds, known once analyzed.
    pub fn duration(&self) -> Option<f32> {
        self.duration
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// The filter applied during the last successful analysis.
    pub fn species_filter(&self) -> Option<&SpeciesFilter> {
        self.species_filter.as_ref()
    }

    /// Filter mode chosen by the last successful validation.
    pub fn filter_mode(&self) -> Option<FilterMode> {
        self.plan.map(|plan| plan.mode())
    }

    /// Audio file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Analysis parameters.
    pub fn options(&self) -> &RecordingOptions {
        &self.options
    }

    /// The analyzer this recording uses.
    pub fn analyzer(&self) -> &Analyzer {
        self.analyzer
    }
}

/// Analyze a file in one call.
pub fn analyze_file(
    analyzer: &Analyzer,
    path: impl Into<PathBuf>,
    options: RecordingOptions,
) -> Result<Vec<Detection>> {
    let mut recording = Recording::new(analyzer, path, options);
    recording.analyze()?;
    Ok(recording.take_detections())
}
