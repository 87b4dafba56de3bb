//! Request orchestration.
//!
//! A [`Service`] is built once at startup. Either the shared
//! [`InferenceContext`] loaded, or the [`StartupError`] that stopped it is kept
//! and every request afterwards is answered with "service unavailable".
//!
//! Per request: validate → normalize → classify → rank.

use serde::Serialize;

use crate::catalog::LabelCatalog;
use crate::classifier::{Classifier, NetworkClassifier};
use crate::config::ServiceConfig;
use crate::error::{PredictError, StartupError};
use crate::preprocess::normalize;
use crate::ranking::{rank, PredictionResponse};
use crate::validate::{validate, RawUpload};

/// Read-only state shared by every request.
pub struct InferenceContext {
    catalog: LabelCatalog,
    classifier: Box<dyn Classifier>,
    top_k: usize,
    threshold: f64,
}

impl InferenceContext {
    pub fn new(
        catalog: LabelCatalog,
        classifier: Box<dyn Classifier>,
        top_k: usize,
        threshold: f64,
    ) -> Result<InferenceContext, StartupError> {
        if catalog.len() != classifier.output_len() {
            return Err(StartupError::LabelCountMismatch {
                labels: catalog.len(),
                outputs: classifier.output_len(),
            });
        }
        Ok(InferenceContext { catalog, classifier, top_k, threshold })
    }

    /// Resolves and loads the label catalog and model named by `config`.
    pub fn load(config: &ServiceConfig) -> Result<InferenceContext, StartupError> {
        let (model_path, labels_path) = config.resolve_artifacts();

        let catalog = LabelCatalog::load(&labels_path)?;
        tracing::info!(path = %labels_path.display(), classes = catalog.len(), "Class names loaded");

        let classifier = NetworkClassifier::load(&model_path)?;
        InferenceContext::new(catalog, Box::new(classifier), config.top_k, config.confidence_threshold)
    }
}

/// Payload of the readiness probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub message: String,
}

pub struct Service {
    readiness: Result<InferenceContext, StartupError>,
}

impl Service {
    pub fn new(readiness: Result<InferenceContext, StartupError>) -> Service {
        Service { readiness }
    }

    /// Loads everything `config` points at. Failure is logged and leaves the
    /// service permanently unavailable rather than aborting the process.
    pub fn initialize(config: &ServiceConfig) -> Service {
        let readiness = InferenceContext::load(config);
        if let Err(e) = &readiness {
            tracing::error!(error = %e, "CRITICAL: model or class names failed to load; serving unavailable responses");
        }
        Service::new(readiness)
    }

    pub fn is_ready(&self) -> bool {
        self.readiness.is_ok()
    }

    pub fn startup_error(&self) -> Option<&StartupError> {
        self.readiness.as_ref().err()
    }

    pub fn health(&self) -> Health {
        match &self.readiness {
            Ok(_) => Health {
                status: "healthy",
                message: "Mushroom classifier API is running".to_owned(),
            },
            Err(e) => Health { status: "unhealthy", message: e.to_string() },
        }
    }

    /// Runs one upload through the full pipeline.
    pub fn predict(&self, upload: Option<&RawUpload>) -> Result<PredictionResponse, PredictError> {
        let ctx = self.readiness.as_ref().map_err(|_| PredictError::ServiceUnavailable)?;

        let upload = validate(upload).inspect_err(|e| {
            tracing::warn!(reason = %e, "Rejected upload");
        })?;
        tracing::info!(
            filename = %upload.filename,
            content_type = %upload.content_type,
            bytes = upload.bytes.len(),
            "Received file"
        );

        let tensor = normalize(&upload.bytes, ctx.classifier.input_size()).inspect_err(|e| {
            tracing::warn!(error = %e, filename = %upload.filename, "Image decode failed");
        })?;

        let probabilities = ctx.classifier.predict(&tensor).inspect_err(|e| {
            tracing::error!(error = %e, "Inference failed");
        })?;

        let response = rank(&probabilities, &ctx.catalog, ctx.top_k, ctx.threshold);
        tracing::debug!(?response, "Sending response");
        Ok(response)
    }
}
