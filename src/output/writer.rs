//! Output writer trait definition.

use crate::error::Result;
use crate::output::Detection;

/// Trait for writing detection results.
pub trait OutputWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single detection.
    fn write_detection(&mut self, detection: &Detection) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}

/// Write a full result set through `writer`.
pub fn write_all(writer: &mut dyn OutputWriter, detections: &[Detection]) -> Result<()> {
    writer.write_header()?;
    for detection in detections {
        writer.write_detection(detection)?;
    }
    writer.finalize()
}
