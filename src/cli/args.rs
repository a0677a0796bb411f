//! CLI argument definitions.

use crate::cli::validators::{
    parse_confidence, parse_date, parse_latitude, parse_longitude, parse_overlap,
};
use crate::config::OutputFormat;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Bird species detection with location and season aware species filtering.
#[derive(Debug, Parser)]
#[command(name = "birdnetlib")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input files or directories to analyze.
    pub inputs: Vec<PathBuf>,

    /// Common options for analysis.
    #[command(flatten)]
    pub analyze: AnalyzeArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Print the species predicted for a location and week.
    Species(SpeciesArgs),
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the species command.
#[derive(Debug, Args)]
pub struct SpeciesArgs {
    /// Latitude (-90.0 to 90.0).
    #[arg(long, value_parser = parse_latitude, allow_hyphen_values = true)]
    pub lat: f64,

    /// Longitude (-180.0 to 180.0).
    #[arg(long, value_parser = parse_longitude, allow_hyphen_values = true)]
    pub lon: f64,

    /// Week of year (1-48). Defaults to the current week.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=48), conflicts_with = "date")]
    pub week: Option<u32>,

    /// Date (YYYY-MM-DD), converted to a week.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Minimum relevance for a species to be listed (overrides config).
    #[arg(long, value_parser = parse_confidence)]
    pub threshold: Option<f32>,

    /// Write the list to a file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for analysis.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct AnalyzeArgs {
    /// Latitude of the recordings (-90.0 to 90.0). Requires --lon.
    #[arg(long, value_parser = parse_latitude, allow_hyphen_values = true,
          requires = "lon", env = "BIRDNETLIB_LATITUDE")]
    pub lat: Option<f64>,

    /// Longitude of the recordings (-180.0 to 180.0). Requires --lat.
    #[arg(long, value_parser = parse_longitude, allow_hyphen_values = true,
          requires = "lat", env = "BIRDNETLIB_LONGITUDE")]
    pub lon: Option<f64>,

    /// Week of year for location filtering (1-48).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=48), conflicts_with = "date")]
    pub week: Option<u32>,

    /// Recording date (YYYY-MM-DD), converted to a week.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Minimum confidence threshold (0.0-1.0).
    #[arg(short = 'c', long, value_parser = parse_confidence, env = "BIRDNETLIB_MIN_CONF")]
    pub min_conf: Option<f32>,

    /// Window overlap in seconds.
    #[arg(long, value_parser = parse_overlap, env = "BIRDNETLIB_OVERLAP")]
    pub overlap: Option<f32>,

    /// Custom species list file, one `Genus species_Common Name` per line.
    /// Cannot be combined with --lat/--lon.
    #[arg(long, env = "BIRDNETLIB_SPECIES_LIST")]
    pub slist: Option<PathBuf>,

    /// Keep every score, ignoring the threshold and species filter.
    #[arg(long)]
    pub return_all: bool,

    /// Custom-trained classifier model. Requires --classifier-labels-path.
    #[arg(long)]
    pub classifier_model_path: Option<PathBuf>,

    /// Labels for the custom-trained classifier. Requires --classifier-model-path.
    #[arg(long)]
    pub classifier_labels_path: Option<PathBuf>,

    /// Minimum relevance for a species to count as predicted (0.0-1.0).
    #[arg(long, value_parser = parse_confidence)]
    pub relevance_floor: Option<f32>,

    /// Output formats (comma-separated: csv,json).
    #[arg(short, long, value_delimiter = ',', env = "BIRDNETLIB_FORMAT")]
    pub format: Option<Vec<OutputFormat>>,

    /// Output directory (default: same as input).
    #[arg(short, long, env = "BIRDNETLIB_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Suppress progress output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace+ORT debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Prefer GPU inference.
    #[arg(long, conflicts_with = "cpu")]
    pub gpu: bool,

    /// Force CPU inference.
    #[arg(long, conflicts_with = "gpu")]
    pub cpu: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_simple() {
        let cli = Cli::try_parse_from(["birdnetlib", "test.wav"]).unwrap();
        assert_eq!(cli.inputs.len(), 1);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_cli_parse_with_options() {
        let cli = Cli::try_parse_from([
            "birdnetlib",
            "test.wav",
            "-c",
            "0.25",
            "--overlap",
            "1.5",
            "--format",
            "csv,json",
            "--return-all",
            "-q",
        ])
        .unwrap();
        assert_eq!(cli.analyze.min_conf, Some(0.25));
        assert_eq!(cli.analyze.overlap, Some(1.5));
        assert_eq!(
            cli.analyze.format,
            Some(vec![OutputFormat::Csv, OutputFormat::Json])
        );
        assert!(cli.analyze.return_all);
        assert!(cli.analyze.quiet);
    }

    #[test]
    fn test_cli_parse_location() {
        let cli = Cli::try_parse_from([
            "birdnetlib",
            "test.wav",
            "--lat",
            "35.4244",
            "--lon",
            "-120.7463",
            "--week",
            "18",
        ])
        .unwrap();
        assert_eq!(cli.analyze.lat, Some(35.4244));
        assert_eq!(cli.analyze.lon, Some(-120.7463));
        assert_eq!(cli.analyze.week, Some(18));
    }

    #[test]
    fn test_cli_lat_requires_lon() {
        let result = Cli::try_parse_from(["birdnetlib", "test.wav", "--lat", "35.4244"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_week_conflicts_with_date() {
        let result = Cli::try_parse_from([
            "birdnetlib",
            "test.wav",
            "--week",
            "18",
            "--date",
            "2022-05-10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_week_range() {
        assert!(Cli::try_parse_from(["birdnetlib", "test.wav", "--week", "49"]).is_err());
        assert!(Cli::try_parse_from(["birdnetlib", "test.wav", "--week", "0"]).is_err());
    }

    #[test]
    fn test_cli_parse_custom_classifier() {
        let cli = Cli::try_parse_from([
            "birdnetlib",
            "test.wav",
            "--classifier-model-path",
            "custom.onnx",
            "--classifier-labels-path",
            "custom_labels.txt",
        ])
        .unwrap();
        assert_eq!(
            cli.analyze.classifier_model_path,
            Some(PathBuf::from("custom.onnx"))
        );
    }

    #[test]
    fn test_cli_parse_config_subcommand() {
        let cli = Cli::try_parse_from(["birdnetlib", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Command::Config {
                action: ConfigAction::Show
            })
        ));
    }

    #[test]
    fn test_cli_parse_species_subcommand() {
        let cli = Cli::try_parse_from([
            "birdnetlib",
            "species",
            "--lat",
            "42.5",
            "--lon",
            "-76.45",
            "--date",
            "2022-05-10",
        ])
        .unwrap();
        let Some(Command::Species(args)) = cli.command else {
            panic!("expected species command");
        };
        assert_eq!(args.lat, 42.5);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2022, 5, 10));
        assert!(args.week.is_none());
    }

    #[test]
    fn test_cli_parse_with_species_list() {
        let cli =
            Cli::try_parse_from(["birdnetlib", "test.wav", "--slist", "species_list.txt"]).unwrap();
        assert_eq!(cli.analyze.slist, Some(PathBuf::from("species_list.txt")));
    }
}
