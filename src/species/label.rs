//! `Scientific name_Common name` label handling.

use std::fmt;

/// A species label split into its scientific and common names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpeciesLabel {
    /// Scientific name, e.g. `Turdus migratorius`.
    pub scientific_name: String,
    /// Common name, e.g. `American Robin`.
    pub common_name: String,
}

impl SpeciesLabel {
    /// Parse a label in `ScientificName_CommonName` format.
    ///
    /// Splits at the first underscore. A label without one is used for both names.
    pub fn parse(label: &str) -> Self {
        let (scientific_name, common_name) = label.split_once('_').map_or_else(
            || (label.to_string(), label.to_string()),
            |(scientific, common)| (scientific.to_string(), common.to_string()),
        );

        Self {
            scientific_name,
            common_name,
        }
    }

    /// The joined `{scientific}_{common}` label.
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SpeciesLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.scientific_name, self.common_name)
    }
}
