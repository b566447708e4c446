//! Response envelopes returned to the caller.

use crate::core::{DetectionOutcome, Label, StoredFile};
use crate::detector::{DetectorState, DetectorStatus};
use crate::error::{ScanError, StorageError};
use serde::{Deserialize, Serialize};

/// Detection outcome after normalization: the outcome plus its public heatmap URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(flatten)]
    pub outcome: DetectionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heatmap_url: Option<String>,
}

/// Successful scan envelope.
///
/// `analysis` is the full outcome kept for debugging; the flattened fields
/// below it are what clients read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResponse {
    pub status: String,
    pub message: String,
    pub file_info: StoredFile,
    pub analysis: Analysis,
    pub prediction: Label,
    pub confidence: f64,
    /// Public heatmap URL, empty when none was produced.
    pub heatmap: String,
    pub explanation: String,
}

impl ScanResponse {
    pub fn new(file_info: StoredFile, analysis: Analysis) -> Self {
        Self {
            status: "success".to_string(),
            message: "Scan completed".to_string(),
            prediction: analysis.outcome.label(),
            confidence: analysis.outcome.score(),
            heatmap: analysis.heatmap_url.clone().unwrap_or_default(),
            explanation: analysis.outcome.explanation().to_string(),
            file_info,
            analysis,
        }
    }
}

/// Envelope for the only client-visible failure: the upload could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub status_code: u16,
    pub detail: String,
}

impl ScanError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            ScanError::Storage(StorageError::EmptyUpload) => 400,
            ScanError::Storage(StorageError::TooLarge { .. }) => 413,
            ScanError::Storage(StorageError::Io { .. }) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            status: "error".to_string(),
            status_code: self.status_code(),
            detail: self.to_string(),
        }
    }
}

/// Liveness report for the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    pub service: String,
    pub version: String,
    pub detector: DetectorState,
    pub detector_status: DetectorStatus,
    pub observers: usize,
}
