pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod preprocess;
pub mod catalog;
pub mod classifier;
pub mod ranking;
pub mod validate;
pub mod config;
pub mod error;
pub mod service;

// Convenience re-exports
pub use math::matrix::Matrix;
pub use activation::activation::ActivationFunction;
pub use layers::dense::Layer;
pub use network::{InputType, ModelMetadata, Network};
pub use preprocess::{normalize, Tensor};
pub use catalog::LabelCatalog;
pub use classifier::{Classifier, NetworkClassifier, ProbabilityVector};
pub use ranking::{rank, PredictionEntry, PredictionResponse};
pub use validate::{validate, RawUpload};
pub use config::ServiceConfig;
pub use error::{ConfigError, DecodeError, InferenceError, PredictError, StartupError, ValidationError};
pub use service::{Health, InferenceContext, Service};
