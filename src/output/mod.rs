//! Output format writers.

mod csv;
mod json;
pub mod progress;
mod types;
mod writer;

pub use csv::CsvWriter;
pub use json::{JsonDetection, JsonResultFile, JsonSettings, JsonSummary, JsonWriter};
pub use types::{Detection, RunContext};
pub use writer::{OutputWriter, write_all};
