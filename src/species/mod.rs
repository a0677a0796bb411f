//! Species labels, custom lists, occurrence prediction and filter resolution.

mod label;
pub mod list;
pub mod occurrence;
pub mod resolver;

pub use label::SpeciesLabel;
pub use list::{parse_species_list, read_species_list};
pub use occurrence::{
    OccurrenceKey, OccurrenceModel, OccurrencePredictor, PredictedSpecies, SpeciesOccurrence,
};
pub use resolver::{FilterMode, FilterPlan, SpeciesFilter, plan_species_filter};
