//! Detection outcome and the labels/tiers that describe it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Classification label attached to every outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Real,
    Fake,
    Error,
}

impl Label {
    /// Map a classifier category onto a label, ignoring case.
    ///
    /// Returns `None` for categories other than real/fake.
    pub fn from_category(category: &str) -> Option<Self> {
        match category.trim().to_ascii_uppercase().as_str() {
            "REAL" => Some(Label::Real),
            "FAKE" => Some(Label::Fake),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Real => "REAL",
            Label::Fake => "FAKE",
            Label::Error => "ERROR",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which fallback tier produced an outcome, ordered by decreasing fidelity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Real model inference.
    Model,
    /// Filename heuristic used when the model is unavailable.
    MockFallback,
    /// Fixed result used when the detection stage itself failed.
    SafeMode,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Model => "MODEL",
            Tier::MockFallback => "MOCK_FALLBACK",
            Tier::SafeMode => "SAFE_MODE",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one scan attempt.
///
/// Fields are private so that `label == Error` always carries a zero score;
/// the constructors below are the only way to build one. Deserialization goes
/// through [`DetectionOutcome::verdict`] as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawOutcome")]
pub struct DetectionOutcome {
    label: Label,
    score: f64,
    explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    heatmap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<Tier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl DetectionOutcome {
    /// A REAL or FAKE verdict. `score` is a percentage and is clamped to `[0, 100]`.
    ///
    /// Passing `Label::Error` produces an error outcome with a zero score.
    pub fn verdict(label: Label, score: f64, tier: Tier) -> Self {
        let score = if label == Label::Error || !score.is_finite() {
            0.0
        } else {
            score.clamp(0.0, 100.0)
        };
        Self {
            label,
            score,
            explanation: String::new(),
            heatmap: None,
            mode: Some(tier),
            details: None,
        }
    }

    /// An ERROR outcome carrying a diagnostic message.
    pub fn error(tier: Tier, detail: impl Into<String>) -> Self {
        Self {
            label: Label::Error,
            score: 0.0,
            explanation: String::new(),
            heatmap: None,
            mode: Some(tier),
            details: Some(Value::String(detail.into())),
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = explanation.into();
        self
    }

    /// Attach a heatmap path; empty paths are treated as "no heatmap".
    pub fn with_heatmap(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.heatmap = if path.is_empty() { None } else { Some(path) };
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn heatmap(&self) -> Option<&str> {
        self.heatmap.as_deref()
    }

    pub fn mode(&self) -> Option<Tier> {
        self.mode
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    pub fn is_fake(&self) -> bool {
        self.label == Label::Fake
    }
}

/// Wire form of [`DetectionOutcome`], normalized on the way in.
#[derive(Deserialize)]
struct RawOutcome {
    label: Label,
    score: f64,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    heatmap: Option<String>,
    #[serde(default)]
    mode: Option<Tier>,
    #[serde(default)]
    details: Option<Value>,
}

impl From<RawOutcome> for DetectionOutcome {
    fn from(raw: RawOutcome) -> Self {
        let mut outcome = DetectionOutcome::verdict(raw.label, raw.score, Tier::Model)
            .with_explanation(raw.explanation)
            .with_heatmap(raw.heatmap.unwrap_or_default());
        outcome.mode = raw.mode;
        outcome.details = raw.details;
        outcome
    }
}

/// Round a percentage to two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
