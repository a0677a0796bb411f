//! `species` command: list the species predicted for a location and week.

#![allow(clippy::print_stdout)]

use crate::cli::SpeciesArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::inference::{OnnxOccurrenceModel, init_runtime};
use crate::species::{OccurrencePredictor, PredictedSpecies, read_species_list};
use crate::utils::date::{current_week, week_of};
use std::fs::File;
use std::io::{BufWriter, Write};
use tracing::info;

/// Predict species for `args` and print or save the list.
pub fn generate_species_list(args: &SpeciesArgs, config: &Config) -> Result<()> {
    let model = config.model.as_ref().ok_or_else(|| Error::ConfigValidation {
        message: "no model configured (set [model] in the config file)".to_string(),
    })?;
    let meta_model = model
        .meta_model
        .as_deref()
        .ok_or(Error::OccurrenceModelMissing)?;

    let labels = read_species_list(&model.labels)?;
    info!("Loaded {} classifier labels", labels.len());

    let threshold = args.threshold.unwrap_or(config.defaults.relevance_floor);
    let week = args
        .week
        .or_else(|| args.date.map(week_of))
        .unwrap_or_else(current_week);

    init_runtime()?;
    let predictor = OccurrencePredictor::new(
        Some(Box::new(OnnxOccurrenceModel::load(meta_model, &labels)?)),
        threshold,
    );
    let species = predictor.predict(args.lat, args.lon, week)?;
    info!(
        "{} species predicted for lat={:.4}, lon={:.4}, week={} (threshold {:.3})",
        species.len(),
        args.lat,
        args.lon,
        week,
        threshold
    );

    match &args.output {
        Some(path) => {
            let file = File::create(path)?;
            write_species_list(BufWriter::new(file), &species)?;
            println!("Species list written to: {}", path.display());
        }
        None => write_species_list(std::io::stdout().lock(), &species)?,
    }

    Ok(())
}

/// One `Genus species_Common Name` per line, most relevant first.
fn write_species_list(mut out: impl Write, species: &PredictedSpecies) -> Result<()> {
    for entry in species.entries() {
        writeln!(out, "{}", entry.label())?;
    }
    out.flush()?;
    Ok(())
}
