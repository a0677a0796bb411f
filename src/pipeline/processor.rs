//! Single file processing: analyze a recording and write its results.

use crate::analyzer::Analyzer;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::{CsvWriter, JsonWriter, OutputWriter, RunContext, write_all};
use crate::pipeline::output_path_for;
use crate::recording::{Recording, RecordingOptions};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Result of processing a single file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Number of detections found.
    pub detections: usize,
    /// Processing duration in seconds.
    pub duration_secs: f64,
    /// Audio duration in seconds.
    pub audio_duration_secs: f32,
    /// Files written.
    pub outputs: Vec<PathBuf>,
}

/// Analyze `input_path` with `analyzer` and write one file per format.
pub fn process_file(
    analyzer: &Analyzer,
    input_path: &Path,
    output_dir: &Path,
    options: &RecordingOptions,
    formats: &[OutputFormat],
) -> Result<ProcessResult> {
    let start_time = Instant::now();
    info!("Processing: {}", input_path.display());

    let mut recording = Recording::new(analyzer, input_path, options.clone());
    recording.analyze()?;

    let context = RunContext::from_recording(&recording);
    let detections = recording.detections();

    if !formats.is_empty() {
        std::fs::create_dir_all(output_dir)?;
    }

    let mut outputs = Vec::with_capacity(formats.len());
    for format in formats {
        let output_path = output_path_for(input_path, output_dir, *format);
        debug!("Writing {} output: {}", format, output_path.display());

        let mut writer: Box<dyn OutputWriter> = match format {
            OutputFormat::Csv => Box::new(CsvWriter::new(&output_path)?),
            OutputFormat::Json => Box::new(JsonWriter::new(&output_path, context.clone())),
        };
        write_all(writer.as_mut(), detections)?;
        outputs.push(output_path);
    }

    let duration_secs = start_time.elapsed().as_secs_f64();
    let audio_duration_secs = context.duration_secs;
    let realtime_factor = if duration_secs > 0.0 {
        f64::from(audio_duration_secs) / duration_secs
    } else {
        0.0
    };
    debug!(
        "{} processed in {:.2}s ({:.1}x realtime)",
        input_path.display(),
        duration_secs,
        realtime_factor
    );

    Ok(ProcessResult {
        detections: detections.len(),
        duration_secs,
        audio_duration_secs,
        outputs,
    })
}
