//! Custom species list loading.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

/// Load a custom species list file.
///
/// UTF-8 text with one `Scientific name_Common name` entry per line. Lines are
/// trimmed and blank lines skipped; entry order is preserved.
pub fn read_species_list(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path).map_err(|e| Error::SpeciesListRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(parse_species_list(&contents))
}

/// Split species list text into entries.
pub fn parse_species_list(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
