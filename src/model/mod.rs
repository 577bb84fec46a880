pub mod loader;
pub mod service;

use crate::error::InferenceError;
use ndarray::Array4;

/// A loaded model that maps one preprocessed image batch to raw class scores.
///
/// Implementations must be safe to call from several requests at once.
pub trait Classifier: Send + Sync {
    /// Runs a forward pass on a `[1, H, W, 3]` batch and returns the score
    /// vector of its single item, unmodified.
    fn predict(&self, input: Array4<f32>) -> Result<Vec<f32>, InferenceError>;
}
