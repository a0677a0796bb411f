//! birdnetlib - bird species detection with location and season filtering.
//!
//! An [`Analyzer`] owns the classifier, the optional custom species list and
//! a cache of location/week species predictions. Each [`Recording`] is one
//! audio file analyzed against a shared analyzer:
//!
//! ```no_run
//! use birdnetlib::{Analyzer, Recording, RecordingOptions};
//! use birdnetlib::config::ModelConfig;
//!
//! # fn main() -> birdnetlib::Result<()> {
//! let analyzer = Analyzer::builder()
//!     .model(ModelConfig {
//!         path: "BirdNET_GLOBAL_6K_V2.4_Model_FP32.onnx".into(),
//!         labels: "BirdNET_GLOBAL_6K_V2.4_Labels.txt".into(),
//!         meta_model: Some("BirdNET_GLOBAL_6K_V2.4_MData_Model_FP16.onnx".into()),
//!     })
//!     .build()?;
//!
//! let mut recording = Recording::new(
//!     &analyzer,
//!     "soundscape.wav",
//!     RecordingOptions {
//!         latitude: Some(35.4244),
//!         longitude: Some(-120.7463),
//!         week: Some(18),
//!         min_conf: 0.25,
//!         ..RecordingOptions::default()
//!     },
//! );
//! for detection in recording.analyze()? {
//!     println!("{} {:.2}", detection.common_name, detection.confidence);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod analyzer;
pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod inference;
pub mod output;
pub mod pipeline;
pub mod recording;
pub mod species;
pub mod utils;

use clap::Parser;
use cli::{AnalyzeArgs, Cli, Command, ConfigAction};
use config::{Config, InferenceDevice, config_file_path, load_default_config, save_default_config};
use pipeline::{collect_input_files, output_dir_for, process_file};
use species::plan_species_filter;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub use analyzer::{Analyzer, AnalyzerBuilder};
pub use error::{Error, Result, ValidationError};
pub use output::Detection;
pub use recording::{Recording, RecordingOptions, RecordingState, analyze_file};

/// Main entry point for the birdnetlib CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.analyze.verbose, cli.analyze.quiet);

    let config = load_default_config()?;

    if let Some(command) = cli.command {
        return handle_command(command, &config);
    }

    if cli.inputs.is_empty() {
        cli::help::print_smart_help(&config);
        return Ok(());
    }

    analyze_files(&cli.inputs, &cli.analyze, &config)
}

/// Merge command line arguments over config defaults.
///
/// Config defaults never introduce a conflict the user did not type: a
/// location on the command line suppresses the default species list, and a
/// species list on the command line suppresses the default location.
fn resolve_options(args: &AnalyzeArgs, config: &Config) -> (RecordingOptions, Option<PathBuf>) {
    let defaults = &config.defaults;
    let cli_location = args.lat.zip(args.lon);

    let location = cli_location.or_else(|| {
        if args.slist.is_none() {
            defaults.latitude.zip(defaults.longitude)
        } else {
            None
        }
    });

    let slist = args.slist.clone().or_else(|| {
        if cli_location.is_none() {
            defaults.species_list_file.clone()
        } else {
            None
        }
    });

    let options = RecordingOptions {
        latitude: location.map(|(lat, _)| lat),
        longitude: location.map(|(_, lon)| lon),
        week: args.week,
        date: args.date,
        min_conf: args.min_conf.unwrap_or(defaults.min_conf),
        overlap: args.overlap.unwrap_or(defaults.overlap),
        return_all_detections: args.return_all,
    };

    (options, slist)
}

/// Analyze input files with the given options.
fn analyze_files(inputs: &[PathBuf], args: &AnalyzeArgs, config: &Config) -> Result<()> {
    use crate::output::progress;
    use std::time::Instant;

    let total_start = Instant::now();

    let (options, slist) = resolve_options(args, config);

    // The overlap bound depends on the classifier window and is rechecked per recording.
    let plan = plan_species_filter(&options, slist.is_some(), f32::INFINITY)?;
    info!("Species filter: {}", plan.mode());

    let files = collect_input_files(inputs)?;
    if files.is_empty() {
        return Err(Error::NoValidAudioFiles);
    }
    info!("Found {} audio file(s) to process", files.len());

    let device = if args.gpu {
        InferenceDevice::Gpu
    } else if args.cpu {
        InferenceDevice::Cpu
    } else {
        config.inference.device
    };

    let mut builder = Analyzer::builder()
        .device(device)
        .top_k(config.inference.top_k)
        .relevance_floor(
            args.relevance_floor
                .unwrap_or(config.defaults.relevance_floor),
        );
    if let Some(model) = &config.model {
        builder = builder.model(model.clone());
    }
    if let Some(path) = &args.classifier_model_path {
        builder = builder.classifier_model_path(path);
    }
    if let Some(path) = &args.classifier_labels_path {
        builder = builder.classifier_labels_path(path);
    }
    if let Some(path) = &slist {
        builder = builder.custom_species_list_path(path);
    }
    builder.validate()?;

    inference::init_runtime()?;
    let analyzer = builder.build()?;

    let formats = args
        .format
        .clone()
        .unwrap_or_else(|| config.defaults.formats.clone());

    let progress_enabled = !args.quiet;
    let file_progress = progress::create_file_progress(files.len(), progress_enabled);

    let mut processed = 0;
    let mut errors = 0;
    let mut total_detections = 0;
    let mut total_audio_secs = 0.0_f64;

    for file in &files {
        progress::set_current(file_progress.as_ref(), &display_name(file));
        let file_output_dir = output_dir_for(file, args.output_dir.as_deref());

        match process_file(&analyzer, file, &file_output_dir, &options, &formats) {
            Ok(result) => {
                processed += 1;
                total_detections += result.detections;
                total_audio_secs += f64::from(result.audio_duration_secs);
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                errors += 1;
                if args.fail_fast {
                    progress::finish_progress(file_progress, "Failed");
                    return Err(e);
                }
            }
        }
        progress::inc_progress(file_progress.as_ref());
    }

    progress::finish_progress(file_progress, "Complete");

    let predictor = analyzer.occurrence_predictor();
    debug!(
        "Occurrence cache: {} entries, {} hits, {} misses",
        analyzer.cached_predictions(),
        predictor.hits(),
        predictor.misses()
    );

    let total_duration = total_start.elapsed().as_secs_f64();
    info!(
        "Complete: {} processed, {} errors, {} total detections in {:.2}s",
        processed, errors, total_detections, total_duration
    );

    if processed > 0 && total_duration > 0.0 {
        info!(
            "Performance: {:.1}x realtime overall",
            total_audio_secs / total_duration
        );
    }

    if errors > 0 {
        warn!("{} file(s) had errors", errors);
    }

    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // ORT logging is suppressed by default because CUDA fallback is expected in auto mode.
    let filter_str = if quiet {
        "warn,ort=off".to_string()
    } else {
        match verbose {
            0 => "info,ort=off".to_string(),
            1 => "debug,ort=warn".to_string(),
            2 => "trace,ort=info".to_string(),
            _ => "trace".to_string(),
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    // Logs go to stderr so species lists on stdout stay pipeable.
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action),
        Command::Species(args) => cli::species::generate_species_list(&args, config),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let saved_path = save_default_config(&Config::default())?;
                println!("Created configuration file: {}", saved_path.display());
                println!("\nNext steps:");
                println!("  Add a [model] section with path, labels and meta_model.");
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("{rendered}");
            Ok(())
        }
        ConfigAction::Path => {
            println!("{}", config_file_path()?.display());
            Ok(())
        }
    }
}
