//! Alert payload pushed to observers when a scan resolves to FAKE.

use super::outcome::DetectionOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    ThreatAlert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    High,
}

/// Message broadcast to every connected observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    #[serde(rename = "type")]
    pub kind: AlertType,
    pub severity: Severity,
    pub message: String,
    pub confidence: f64,
    pub image_url: String,
}

impl AlertPayload {
    /// Build the alert for a FAKE outcome.
    ///
    /// `image_url` is the public heatmap URL, if one was produced.
    pub fn threat(outcome: &DetectionOutcome, image_url: Option<&str>) -> Self {
        let reason = if outcome.explanation().is_empty() {
            "Unknown threat"
        } else {
            outcome.explanation()
        };
        Self {
            kind: AlertType::ThreatAlert,
            severity: Severity::High,
            message: format!("Deepfake detected: {reason}"),
            confidence: outcome.score(),
            image_url: image_url.unwrap_or_default().to_string(),
        }
    }
}
