//! Configuration for the scan service.
//!
//! Provides centralized configuration for every pipeline stage with
//! sensible defaults, environment overrides and JSON file loading.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Master configuration for the scan service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Service identity reported by health checks.
    pub service: ServiceConfig,
    /// Detector configuration (lite mode, model identifier).
    pub detector: DetectorConfig,
    /// Upload storage configuration.
    pub storage: StorageConfig,
    /// Alert fan-out configuration.
    pub alerts: AlertConfig,
    /// Pipeline-level configuration.
    pub pipeline: PipelineConfig,
}

/// Service identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub version: String,
    /// Route prefix under which stored uploads and heatmaps are served.
    pub uploads_route: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "MediaScan Backend".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uploads_route: "/uploads".to_string(),
        }
    }
}

/// Detector configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Skip real model loading entirely to bound memory usage (default: false).
    pub lite_mode: bool,
    /// Identifier of the pretrained classifier to load.
    pub model_id: String,
    /// Inclusive score range for mock REAL verdicts (default: 85..=99).
    /// Bounds outside `[0, 100]` are clamped when sampling.
    pub mock_real_range: (f64, f64),
    /// Inclusive score range for mock FAKE verdicts (default: 75..=98).
    pub mock_fake_range: (f64, f64),
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            lite_mode: false,
            model_id: "dima806/deepfake_vs_real_image_detection".to_string(),
            mock_real_range: (85.0, 99.0),
            mock_fake_range: (75.0, 98.0),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory uploads and heatmaps are written to (default: "uploads").
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size (default: 52428800 = 50MB).
    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 50 * 1024 * 1024,
        }
    }
}

/// Alert fan-out configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertConfig {
    /// Minimum FAKE score that triggers a broadcast (default: 0.0, every FAKE).
    pub min_confidence: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
        }
    }
}

/// Pipeline-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Optional deadline for the detection stage in seconds (default: none).
    pub detection_timeout_secs: Option<u64>,
}

impl ScanConfig {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Ok(config)
    }

    /// Defaults with overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a key lookup.
    ///
    /// Recognised keys: `LITE_MODE`, `MODEL_ID`, `UPLOAD_DIR`,
    /// `MAX_UPLOAD_BYTES`, `ALERT_MIN_CONFIDENCE`, `DETECTION_TIMEOUT_SECS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LITE_MODE") {
            // Anything other than "true" leaves lite mode off.
            self.detector.lite_mode = v.trim().eq_ignore_ascii_case("true");
        }
        if let Some(v) = lookup("MODEL_ID") {
            self.detector.model_id = v;
        }
        if let Some(v) = lookup("UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MAX_UPLOAD_BYTES") {
            self.storage.max_upload_bytes = parse_env("MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = lookup("ALERT_MIN_CONFIDENCE") {
            self.alerts.min_confidence = parse_env("ALERT_MIN_CONFIDENCE", &v)?;
        }
        if let Some(v) = lookup("DETECTION_TIMEOUT_SECS") {
            self.pipeline.detection_timeout_secs = Some(parse_env("DETECTION_TIMEOUT_SECS", &v)?);
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key: key.to_string(),
        value: value.to_string(),
    })
}
