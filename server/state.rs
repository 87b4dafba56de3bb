use std::sync::Arc;

use mushroom_classifier::{Service, ServiceConfig};

/// Everything a request handler reads. Immutable after startup.
pub struct AppState {
    pub service: Service,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: Service, config: &ServiceConfig) -> Self {
        AppState {
            service,
            allowed_origins: config.allowed_origins.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    /// True when `origin` is on the CORS allow-list.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.allowed_origins.iter().any(|o| o == origin)
    }
}

/// Shared state type: an `Arc<AppState>` passed to every handler.
pub type SharedState = Arc<AppState>;
