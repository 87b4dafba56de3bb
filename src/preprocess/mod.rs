//! Turns uploaded image bytes into the tensor layout the classifier consumes.

pub mod normalize;
pub mod tensor;

pub use normalize::{normalize, DEFAULT_TARGET_SIZE};
pub use tensor::Tensor;
