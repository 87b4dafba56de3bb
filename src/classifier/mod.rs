//! The classifier seam: tensor in, probability vector out.
//!
//! The pipeline never looks inside a model. Anything that can honour the
//! [`Classifier`] contract can sit behind the service, and the bundled
//! [`NetworkClassifier`] runs a serialized feed-forward network.

pub mod network_classifier;

pub use network_classifier::NetworkClassifier;

use crate::error::InferenceError;
use crate::preprocess::Tensor;

/// One probability per class, index-aligned with the label catalog.
pub type ProbabilityVector = Vec<f64>;

pub trait Classifier: Send + Sync {
    /// (width, height) images must be normalized to before `predict`.
    fn input_size(&self) -> (u32, u32);

    /// Length of every vector `predict` returns.
    fn output_len(&self) -> usize;

    /// Runs the model on a `[1, height, width, 3]` tensor.
    ///
    /// Must be safe to call from several request threads at once; adapters
    /// over non-reentrant models serialize internally.
    fn predict(&self, tensor: &Tensor) -> Result<ProbabilityVector, InferenceError>;
}
