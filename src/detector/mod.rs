//! Image manipulation detector with graceful degradation.
//!
//! The detector owns a lazily loaded [`ImageClassifier`]. The load happens at
//! most once per detector, on the first [`Detector::classify`] call, and its
//! outcome (loaded or failed) is permanent:
//!
//! ```text
//! UNINITIALIZED -> (lite mode ? SKIPPED : LOADING) -> LOADED | FAILED
//! ```
//!
//! Concurrent first requests block on the same load and observe the same
//! terminal state. When the model is unavailable every request is served by
//! the filename heuristic in [`Detector::mock_classify`].

pub mod mock;
pub mod model;

use crate::config::DetectorConfig;
use crate::core::outcome::round2;
use crate::core::{DetectionOutcome, Label, Tier};
use crate::error::{panic_message, InferenceError, ModelLoadError};
use crate::explain::Explainer;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};
use tracing::{debug, error, info, warn};

pub use model::{ImageClassifier, MissingBackend, ModelLoader, Prediction};

type LoadedModel = Result<Box<dyn ImageClassifier>, ModelLoadError>;

/// Where the detector is in its one-time load transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorStatus {
    Uninitialized,
    Skipped,
    Loaded,
    Failed,
}

impl DetectorStatus {
    /// True once the detector can no longer reach the model tier.
    pub fn is_degraded(&self) -> bool {
        matches!(self, DetectorStatus::Skipped | DetectorStatus::Failed)
    }
}

/// Snapshot of the detector's load state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorState {
    pub load_attempted: bool,
    pub loaded: bool,
    pub lite_mode: bool,
}

pub struct Detector {
    loader: Box<dyn ModelLoader>,
    lite_mode: bool,
    model: OnceLock<LoadedModel>,
    explainer: Explainer,
    rng: Mutex<StdRng>,
    real_range: (f64, f64),
    fake_range: (f64, f64),
}

impl Detector {
    pub fn new(config: &DetectorConfig, loader: Box<dyn ModelLoader>, explainer: Explainer) -> Self {
        if config.lite_mode {
            info!("Lite mode active: real model loading skipped");
        } else {
            info!(model = loader.model_id(), "Detector initialized, model will load on first use");
        }
        Self {
            loader,
            lite_mode: config.lite_mode,
            model: OnceLock::new(),
            explainer,
            rng: Mutex::new(StdRng::from_entropy()),
            real_range: config.mock_real_range,
            fake_range: config.mock_fake_range,
        }
    }

    /// Detector without an inference backend; every request uses the mock tier.
    pub fn without_backend(config: &DetectorConfig, explainer: Explainer) -> Self {
        let loader = Box::new(MissingBackend::new(config.model_id.clone()));
        Self::new(config, loader, explainer)
    }

    /// Replace the score source, e.g. with a seeded generator in tests.
    pub fn with_rng(self, rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            ..self
        }
    }

    pub fn lite_mode(&self) -> bool {
        self.lite_mode
    }

    pub fn status(&self) -> DetectorStatus {
        if self.lite_mode {
            return DetectorStatus::Skipped;
        }
        match self.model.get() {
            None => DetectorStatus::Uninitialized,
            Some(Ok(_)) => DetectorStatus::Loaded,
            Some(Err(_)) => DetectorStatus::Failed,
        }
    }

    pub fn state(&self) -> DetectorState {
        DetectorState {
            load_attempted: self.model.get().is_some(),
            loaded: self.is_loaded(),
            lite_mode: self.lite_mode,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status() == DetectorStatus::Loaded
    }

    /// The error that ended the load, if it failed.
    pub fn load_error(&self) -> Option<&ModelLoadError> {
        self.model.get().and_then(|m| m.as_ref().err())
    }

    /// Run the one-time load transition if it has not happened yet.
    ///
    /// Returns whether the model is loaded. Never retries a failed load.
    pub fn ensure_loaded(&self) -> bool {
        if self.lite_mode {
            return false;
        }
        self.model.get_or_init(|| self.load_model()).is_ok()
    }

    fn load_model(&self) -> LoadedModel {
        info!(model = self.loader.model_id(), "Loading detection model");
        // A panicking backend still has to settle the slot, or every request
        // would attempt the load again.
        let result = match panic::catch_unwind(AssertUnwindSafe(|| self.loader.load())) {
            Ok(result) => result,
            Err(payload) => Err(ModelLoadError::LoadFailed {
                model: self.loader.model_id().to_string(),
                message: format!("loader panicked: {}", panic_message(payload)),
            }),
        };
        match &result {
            Ok(_) => info!(model = self.loader.model_id(), "Model loaded"),
            Err(e) => error!(model = self.loader.model_id(), error = %e, "Model load failed"),
        }
        result
    }

    /// Classify an image with the real model, falling back to the mock tier
    /// when the model is unavailable.
    ///
    /// Inference errors become an ERROR outcome; they are never returned.
    pub fn classify(&self, path: &Path) -> DetectionOutcome {
        if !self.ensure_loaded() {
            debug!(path = %path.display(), "Model unavailable, using mock tier");
            return self.mock_classify(path);
        }
        let Some(Ok(model)) = self.model.get() else {
            return self.mock_classify(path);
        };

        match self.run_model(model.as_ref(), path) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Inference failed");
                DetectionOutcome::error(Tier::Model, e.to_string())
            }
        }
    }

    fn run_model(
        &self,
        model: &dyn ImageClassifier,
        path: &Path,
    ) -> Result<DetectionOutcome, InferenceError> {
        if !path.exists() {
            return Err(InferenceError::NotFound(path.to_path_buf()));
        }
        let predictions = model.classify(path)?;
        let top = model::top_prediction(&predictions).ok_or(InferenceError::NoPredictions)?;
        let label = Label::from_category(&top.label)
            .ok_or_else(|| InferenceError::UnexpectedCategory(top.label.clone()))?;
        let confidence = top.score * 100.0;

        let explanation = self.explainer.generate(path, label);
        let text = match label {
            Label::Fake => format!(
                "Model detected statistical anomalies inconsistent with natural facial textures (Confidence: {confidence:.1}%)."
            ),
            _ => "No significant manipulation artifacts detected in facial features.".to_string(),
        };

        debug!(path = %path.display(), %label, confidence, "Model verdict");
        Ok(DetectionOutcome::verdict(label, round2(confidence), Tier::Model)
            .with_explanation(text)
            .with_heatmap(explanation.heatmap_path)
            .with_details(serde_json::to_value(&predictions).unwrap_or_default()))
    }

    /// Filename heuristic tier: "real" in the name means REAL, anything else FAKE.
    ///
    /// Total for any path; a missing file yields an ERROR outcome.
    pub fn mock_classify(&self, path: &Path) -> DetectionOutcome {
        if !path.exists() {
            return DetectionOutcome::error(Tier::MockFallback, "File not found");
        }

        let label = mock::label_for_name(path);
        let range = match label {
            Label::Real => self.real_range,
            _ => self.fake_range,
        };
        let score = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            mock::sample_score(&mut *rng, range)
        };

        let explanation = self.explainer.generate(path, label);
        let text = if explanation.explanation.is_empty() {
            String::new()
        } else {
            format!("Demo Mode: {}", explanation.explanation)
        };

        DetectionOutcome::verdict(label, round2(score), Tier::MockFallback)
            .with_explanation(text)
            .with_heatmap(explanation.heatmap_path)
    }
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("model", &self.loader.model_id())
            .field("status", &self.status())
            .field("explainer", &self.explainer)
            .finish()
    }
}
