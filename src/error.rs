//! Error types for the scan pipeline.
//!
//! Only [`StorageError`] (wrapped in [`ScanError`]) is ever surfaced to a
//! caller. Every other error in this module is recovered inside the
//! pipeline and degrades the result instead of failing the request.

use std::any::Any;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to persist an upload. Fatal for the request.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("No file uploaded")]
    EmptyUpload,

    #[error("Upload of {found} bytes exceeds the limit of {limit} bytes")]
    TooLarge { limit: u64, found: u64 },

    #[error("I/O error writing {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to bring the inference backend up. Permanent for the process.
#[derive(Debug, Clone, Error)]
pub enum ModelLoadError {
    #[error("No inference backend available for model '{model}'")]
    BackendUnavailable { model: String },

    #[error("Failed to load model '{model}': {message}")]
    LoadFailed { model: String, message: String },
}

/// Failure while running the loaded model on one image.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unreadable image {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("Model returned no predictions")]
    NoPredictions,

    #[error("Model returned unexpected category '{0}'")]
    UnexpectedCategory(String),

    #[error("Inference failed: {0}")]
    Runtime(String),
}

/// Failure to render a heatmap. Absorbed by the explainer.
#[derive(Debug, Error)]
pub enum ExplainError {
    #[error("Image not found: {}", .0.display())]
    MissingImage(PathBuf),

    #[error("Image has no usable file name: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("Failed to write heatmap {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to deliver to a single observer. Causes that observer's removal.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("Observer {0} is disconnected")]
    Disconnected(String),

    #[error("Failed to encode alert: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure of the detection stage as a whole. Replaced by the safe-mode result.
#[derive(Debug, Error)]
pub enum DetectionFailure {
    #[error("Detection task panicked: {0}")]
    Panicked(String),

    #[error("Detection task was cancelled")]
    Cancelled,

    #[error("Detection timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: String, value: String },
}

/// Error crossing the orchestrator boundary.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("File save error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, ScanError>;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
