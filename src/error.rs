use std::path::PathBuf;

/// Invalid startup configuration. Fatal before the server binds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Failure to bring up the shared inference context.
///
/// Stored once at startup; every request afterwards short-circuits to
/// "service unavailable" while it is present.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Could not load class names from {}: {reason}", .path.display())]
    CatalogLoad { path: PathBuf, reason: String },

    #[error("Could not load model from {}: {reason}", .path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Model produces {outputs} outputs but {labels} class names were loaded")]
    LabelCountMismatch { labels: usize, outputs: usize },
}

/// Upload preconditions, checked before any decoding happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No file provided")]
    MissingFile,

    #[error("No selected file")]
    EmptyFilename,

    #[error("Uploaded file is not an image")]
    NotAnImage { content_type: String },
}

/// The uploaded bytes are not a decodable still image.
#[derive(Debug, thiserror::Error)]
#[error("Could not decode image: {source}")]
pub struct DecodeError {
    #[from]
    source: image::ImageError,
}

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Tensor shape {actual:?} does not match model input {expected:?}")]
    ShapeMismatch { expected: [usize; 4], actual: [usize; 4] },

    #[error("Model returned {actual} probabilities, expected {expected}")]
    OutputLength { expected: usize, actual: usize },

    #[error("Model returned a non-finite probability at index {index}")]
    NonFinite { index: usize },

    #[error("Model is unusable after an earlier panic during inference")]
    Poisoned,
}

/// Terminal error states of a single prediction request.
#[derive(Debug, thiserror::Error)]
pub enum PredictError {
    #[error("Model not loaded or class names missing on server.")]
    ServiceUnavailable,

    #[error(transparent)]
    Rejected(#[from] ValidationError),

    #[error(transparent)]
    DecodeFailed(#[from] DecodeError),

    #[error(transparent)]
    InferenceFailed(#[from] InferenceError),
}

impl PredictError {
    /// HTTP status the transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            PredictError::Rejected(_)        => 400,
            PredictError::DecodeFailed(_)    => 422,
            PredictError::InferenceFailed(_) => 500,
            PredictError::ServiceUnavailable => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_match_client_contract() {
        assert_eq!(ValidationError::MissingFile.to_string(), "No file provided");
        assert_eq!(ValidationError::EmptyFilename.to_string(), "No selected file");
        assert_eq!(
            ValidationError::NotAnImage { content_type: "text/plain".into() }.to_string(),
            "Uploaded file is not an image"
        );
    }

    #[test]
    fn terminal_states_map_to_status_codes() {
        let codes = [
            PredictError::ServiceUnavailable.status_code(),
            PredictError::Rejected(ValidationError::MissingFile).status_code(),
            PredictError::InferenceFailed(InferenceError::Poisoned).status_code(),
            PredictError::InferenceFailed(InferenceError::NonFinite { index: 0 }).status_code(),
        ];
        assert_eq!(codes, [500, 400, 500, 500]);
    }
}
