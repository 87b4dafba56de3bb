use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::ranking::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_TOP_K};

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_MODEL_PATH: &str = "model/mushroom.json";
pub const DEFAULT_LABELS_PATH: &str = "class_names.json";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:5173",
    "http://127.0.0.1:3000",
    "http://127.0.0.1:5173",
    "https://ai-mushroom-classifier-r2ed.vercel.app",
];

/// Process-wide settings, read once before the server starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind: String,
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    /// Base directories tried when `model_path`/`labels_path` do not exist.
    pub search_dirs: Vec<PathBuf>,
    pub top_k: usize,
    pub confidence_threshold: f64,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            bind: DEFAULT_BIND.to_owned(),
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            labels_path: PathBuf::from(DEFAULT_LABELS_PATH),
            search_dirs: Vec::new(),
            top_k: DEFAULT_TOP_K,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ServiceConfig::default();

        if let Some(bind) = lookup("MUSHROOM_BIND") {
            config.bind = bind;
        }
        if let Some(path) = lookup("MUSHROOM_MODEL_PATH") {
            config.model_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("MUSHROOM_LABELS_PATH") {
            config.labels_path = PathBuf::from(path);
        }
        if let Some(dirs) = lookup("MUSHROOM_SEARCH_DIRS") {
            config.search_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(raw) = lookup("MUSHROOM_TOP_K") {
            config.top_k = match raw.trim().parse::<usize>() {
                Ok(k) if k >= 1 => k,
                _ => return Err(invalid("MUSHROOM_TOP_K", raw, "expected an integer >= 1")),
            };
        }
        if let Some(raw) = lookup("MUSHROOM_CONFIDENCE_THRESHOLD") {
            config.confidence_threshold = match raw.trim().parse::<f64>() {
                Ok(t) if (0.0..=1.0).contains(&t) => t,
                _ => return Err(invalid("MUSHROOM_CONFIDENCE_THRESHOLD", raw, "expected a number in [0, 1]")),
            };
        }
        if let Some(raw) = lookup("MUSHROOM_ALLOWED_ORIGINS") {
            config.allowed_origins = raw
                .split(',')
                .map(|s| s.trim().trim_end_matches('/').to_owned())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(raw) = lookup("MUSHROOM_MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(invalid("MUSHROOM_MAX_UPLOAD_BYTES", raw, "expected a positive byte count")),
            };
        }

        Ok(config)
    }

    /// Picks the model and label files to load.
    ///
    /// The configured paths win when both exist. Otherwise each fallback base
    /// (configured search dirs, then the executable's directory and its
    /// parent) is tried with the relative paths joined on; the first base
    /// holding both files is used. If none does, the configured paths are
    /// returned unchanged and loading reports what is missing.
    pub fn resolve_artifacts(&self) -> (PathBuf, PathBuf) {
        if self.model_path.exists() && self.labels_path.exists() {
            return (self.model_path.clone(), self.labels_path.clone());
        }

        for base in self.fallback_bases() {
            let model = base.join(&self.model_path);
            let labels = base.join(&self.labels_path);
            if model.exists() && labels.exists() {
                tracing::info!(base = %base.display(), "Using fallback artifact directory");
                return (model, labels);
            }
        }

        (self.model_path.clone(), self.labels_path.clone())
    }

    fn fallback_bases(&self) -> Vec<PathBuf> {
        let mut bases = self.search_dirs.clone();
        if let Some(exe_dir) = std::env::current_exe().ok().as_deref().and_then(Path::parent) {
            bases.push(exe_dir.to_path_buf());
            if let Some(parent) = exe_dir.parent() {
                bases.push(parent.to_path_buf());
            }
        }
        bases
    }
}

fn invalid(var: &'static str, value: String, reason: &str) -> ConfigError {
    ConfigError::InvalidValue { var, value, reason: reason.to_owned() }
}
