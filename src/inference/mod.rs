//! Inference backends for the classifier and occurrence model.

mod classifier;
mod range_filter;

pub use classifier::{Classify, OnnxClassifier, SpeciesScore, check_window_len};
pub use range_filter::OnnxOccurrenceModel;

use crate::error::{Error, Result};

/// Initialize ONNX Runtime. Must run before any ONNX model is loaded.
pub fn init_runtime() -> Result<()> {
    birdnet_onnx::init_runtime().map_err(|e| Error::RuntimeInitialization {
        reason: e.to_string(),
    })?;
    Ok(())
}
