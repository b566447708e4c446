//! Scan orchestration: storage, detection, normalization, alerting.
//!
//! Failure containment is tiered. Only a storage failure fails the request.
//! Detection degrades from the model to the filename heuristic inside the
//! detector, and a failure of the detection stage itself (a panic or an
//! expired deadline) is replaced by a fixed safe-mode result. Explanation
//! and broadcast failures are absorbed.

pub mod response;

use crate::config::ScanConfig;
use crate::core::{AlertPayload, DetectionOutcome, Label, Tier, Upload};
use crate::detector::Detector;
use crate::error::{panic_message, DetectionFailure, Result};
use crate::explain::{Explainer, OverlayRenderer};
use crate::notify::Notifier;
use crate::storage::{LocalStorage, Storage};
use crate::timeout::{with_deadline, Deadline};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};

pub use response::{Analysis, ErrorResponse, HealthReport, ScanResponse};

/// Score reported by the safe-mode tier.
pub const SAFE_MODE_SCORE: f64 = 95.5;

/// Explanation reported by the safe-mode tier.
pub const SAFE_MODE_EXPLANATION: &str = "Simulated Result: Deepfake artifacts detected (Demo Mode)";

/// Heatmap variant written by the safe-mode tier.
pub const SAFE_MODE_HEATMAP: &str = "safe";

pub struct Scanner<S> {
    config: ScanConfig,
    storage: S,
    detector: Arc<Detector>,
    explainer: Explainer,
    notifier: Arc<Notifier>,
}

impl Scanner<LocalStorage> {
    /// Build the whole pipeline from configuration: local storage, an
    /// SVG-overlay explainer, a detector without inference backend and an
    /// empty notifier.
    pub fn from_config(config: ScanConfig) -> Self {
        let storage = LocalStorage::new(&config.storage);
        let explainer = Explainer::new(Arc::new(OverlayRenderer::default()));
        let detector = Arc::new(Detector::without_backend(&config.detector, explainer.clone()));
        Self::new(config, storage, detector, explainer, Arc::new(Notifier::new()))
    }
}

impl<S: Storage> Scanner<S> {
    pub fn new(
        config: ScanConfig,
        storage: S,
        detector: Arc<Detector>,
        explainer: Explainer,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            config,
            storage,
            detector,
            explainer,
            notifier,
        }
    }

    pub fn detector(&self) -> &Arc<Detector> {
        &self.detector
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Store, classify, explain and alert on one upload.
    ///
    /// Fails only when the upload cannot be stored; in that case nothing is
    /// broadcast.
    pub async fn handle_scan(&self, upload: Upload) -> Result<ScanResponse> {
        let span = info_span!("scan", upload = %upload.filename, size = upload.len());
        self.run_scan(upload).instrument(span).await
    }

    async fn run_scan(&self, upload: Upload) -> Result<ScanResponse> {
        let stored = self.storage.save(upload).await.map_err(|e| {
            warn!(error = %e, "Upload could not be stored");
            e
        })?;

        let outcome = match self.detect(stored.local_path.clone()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Detection stage failed, using safe mode");
                self.safe_mode(&stored.local_path)
            }
        };

        let heatmap_url = outcome.heatmap().and_then(|h| self.public_url(h));
        let analysis = Analysis {
            outcome,
            heatmap_url,
        };
        self.alert(&analysis);

        info!(
            prediction = %analysis.outcome.label(),
            confidence = analysis.outcome.score(),
            mode = analysis.outcome.mode().map(|m| m.as_str()).unwrap_or("NONE"),
            "Scan completed"
        );
        Ok(ScanResponse::new(stored, analysis))
    }

    /// Run the detection stage on the blocking pool.
    ///
    /// Uses the model tier unless the detector has already settled on being
    /// unable to load it; the first request therefore triggers the lazy load.
    async fn detect(&self, path: PathBuf) -> std::result::Result<DetectionOutcome, DetectionFailure> {
        let detector = Arc::clone(&self.detector);
        let use_model = !detector.status().is_degraded();
        debug!(use_model, path = %path.display(), "Starting detection");

        let task = tokio::task::spawn_blocking(move || {
            if use_model {
                detector.classify(&path)
            } else {
                detector.mock_classify(&path)
            }
        });

        let deadline = Deadline::new(self.config.pipeline.detection_timeout_secs, "detection");
        with_deadline(deadline, async move {
            task.await.map_err(|e| {
                if e.is_panic() {
                    DetectionFailure::Panicked(panic_message(e.into_panic()))
                } else {
                    DetectionFailure::Cancelled
                }
            })
        })
        .await
    }

    /// Fixed FAKE result with a best-effort heatmap.
    ///
    /// The heatmap gets its own name: an abandoned detection task may still
    /// write the regular one for the same upload.
    fn safe_mode(&self, path: &Path) -> DetectionOutcome {
        let explanation = self.explainer.generate_variant(path, Label::Fake, SAFE_MODE_HEATMAP);
        DetectionOutcome::verdict(Label::Fake, SAFE_MODE_SCORE, Tier::SafeMode)
            .with_explanation(SAFE_MODE_EXPLANATION)
            .with_heatmap(explanation.heatmap_path)
    }

    /// Map a heatmap file path to its URL under the uploads route.
    fn public_url(&self, heatmap: &str) -> Option<String> {
        let name = Path::new(heatmap).file_name()?.to_str()?;
        let route = self.config.service.uploads_route.trim_end_matches('/');
        Some(format!("{route}/{name}"))
    }

    fn alert(&self, analysis: &Analysis) {
        let outcome = &analysis.outcome;
        if !outcome.is_fake() {
            return;
        }
        if outcome.score() < self.config.alerts.min_confidence {
            debug!(
                confidence = outcome.score(),
                threshold = self.config.alerts.min_confidence,
                "FAKE below alert threshold"
            );
            return;
        }

        let payload = AlertPayload::threat(outcome, analysis.heatmap_url.as_deref());
        let report = self.notifier.broadcast_report(&payload);
        info!(
            delivered = report.delivered,
            dropped = report.dropped.len(),
            "Threat alert broadcast"
        );
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "online".to_string(),
            service: self.config.service.name.clone(),
            version: self.config.service.version.clone(),
            detector: self.detector.state(),
            detector_status: self.detector.status(),
            observers: self.notifier.len(),
        }
    }
}
