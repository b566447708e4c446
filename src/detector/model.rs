//! Inference backend abstraction.
//!
//! The detector never sees model weights. A [`ModelLoader`] is asked once to
//! produce an [`ImageClassifier`]; the classifier ranks categories for an
//! image path.

use crate::error::{InferenceError, ModelLoadError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One ranked category returned by a classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub score: f64,
}

impl Prediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A loaded binary image classifier.
pub trait ImageClassifier: Send + Sync {
    /// Rank categories for the image at `path`.
    fn classify(&self, path: &Path) -> Result<Vec<Prediction>, InferenceError>;
}

/// Produces a classifier. Invoked at most once per detector.
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn ImageClassifier>, ModelLoadError>;

    fn model_id(&self) -> &str;
}

/// Loader used when no inference backend is compiled in. Always fails,
/// which sends every request down the mock tier.
#[derive(Debug, Clone)]
pub struct MissingBackend {
    model: String,
}

impl MissingBackend {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }
}

impl ModelLoader for MissingBackend {
    fn load(&self) -> Result<Box<dyn ImageClassifier>, ModelLoadError> {
        Err(ModelLoadError::BackendUnavailable {
            model: self.model.clone(),
        })
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}

/// Highest-scoring prediction, ignoring non-finite scores.
pub fn top_prediction(predictions: &[Prediction]) -> Option<&Prediction> {
    predictions
        .iter()
        .filter(|p| p.score.is_finite())
        .max_by(|a, b| a.score.total_cmp(&b.score))
}
