//! CSV output format writer.

use crate::constants::confidence::DECIMAL_PLACES;
use crate::error::{Error, Result};
use crate::output::{Detection, OutputWriter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column headers, in output order.
pub const HEADER: [&str; 6] = [
    "Start (s)",
    "End (s)",
    "Scientific name",
    "Common name",
    "Confidence",
    "Predicted for location",
];

/// Results table in the `BirdNET` CSV layout.
pub struct CsvWriter<W: Write = File> {
    writer: csv::Writer<W>,
    path: PathBuf,
}

impl CsvWriter<File> {
    /// Create a writer for `path`, truncating any existing file.
    pub fn new(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path).map_err(|e| Error::OutputWrite {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }
}

impl<W: Write> CsvWriter<W> {
    /// Write CSV into any sink. `label` names it in error messages.
    pub fn from_writer(sink: W, label: impl Into<PathBuf>) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
            path: label.into(),
        }
    }

    /// Flush and return the underlying sink.
    pub fn into_inner(self) -> Result<W> {
        let path = self.path;
        self.writer.into_inner().map_err(|e| Error::OutputWrite {
            path,
            source: Box::new(e.into_error()),
        })
    }

    fn wrap<E>(&self, source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::OutputWrite {
            path: self.path.clone(),
            source: Box::new(source),
        }
    }
}

impl<W: Write> OutputWriter for CsvWriter<W> {
    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(HEADER)
            .map_err(|e| self.wrap(e))
    }

    fn write_detection(&mut self, detection: &Detection) -> Result<()> {
        let record = [
            format!("{:.1}", detection.start_time),
            format!("{:.1}", detection.end_time),
            detection.scientific_name.clone(),
            detection.common_name.clone(),
            format!("{:.decimal$}", detection.confidence, decimal = DECIMAL_PLACES),
            detection.is_predicted_for_location_and_date.to_string(),
        ];
        self.writer
            .write_record(&record)
            .map_err(|e| self.wrap(e))
    }

    fn finalize(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| self.wrap(e))
    }
}
