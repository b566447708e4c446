//! Heatmap and explanation generation.
//!
//! The explainer is decoupled from model introspection: it only needs the
//! image path and the label, so it stays available on every detection tier,
//! including the mock and safe-mode fallbacks.

pub mod overlay;

use crate::core::Label;
use crate::error::ExplainError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub use overlay::OverlayRenderer;

/// Renders a heatmap artifact for an image and returns the written path.
///
/// `variant` distinguishes artifacts for the same image that must not
/// overwrite each other.
pub trait HeatmapRenderer: Send + Sync {
    fn render(
        &self,
        image: &Path,
        label: Label,
        variant: Option<&str>,
    ) -> Result<PathBuf, ExplainError>;

    fn name(&self) -> &str;
}

/// Heatmap path plus a caption describing it. Both empty when generation failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Explanation {
    pub heatmap_path: String,
    pub explanation: String,
}

impl Explanation {
    pub fn is_empty(&self) -> bool {
        self.heatmap_path.is_empty() && self.explanation.is_empty()
    }
}

/// Infallible front for a [`HeatmapRenderer`].
#[derive(Clone)]
pub struct Explainer {
    renderer: Arc<dyn HeatmapRenderer>,
}

impl Explainer {
    pub fn new(renderer: Arc<dyn HeatmapRenderer>) -> Self {
        Self { renderer }
    }

    /// Explainer backed by the bundled SVG overlay renderer.
    pub fn overlay() -> Self {
        Self::new(Arc::new(OverlayRenderer::default()))
    }

    /// Generate a heatmap and caption. Never fails; errors yield an empty [`Explanation`].
    pub fn generate(&self, image: &Path, label: Label) -> Explanation {
        self.render(image, label, None)
    }

    /// [`Explainer::generate`] into a separately named artifact.
    pub fn generate_variant(&self, image: &Path, label: Label, variant: &str) -> Explanation {
        self.render(image, label, Some(variant))
    }

    fn render(&self, image: &Path, label: Label, variant: Option<&str>) -> Explanation {
        match self.renderer.render(image, label, variant) {
            Ok(path) => {
                debug!(
                    image = %image.display(),
                    heatmap = %path.display(),
                    renderer = self.renderer.name(),
                    "Heatmap generated"
                );
                Explanation {
                    heatmap_path: path.to_string_lossy().into_owned(),
                    explanation: caption(label).to_string(),
                }
            }
            Err(e) => {
                warn!(image = %image.display(), error = %e, "Explanation generation failed");
                Explanation::default()
            }
        }
    }
}

impl std::fmt::Debug for Explainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explainer")
            .field("renderer", &self.renderer.name())
            .finish()
    }
}

fn caption(label: Label) -> &'static str {
    match label {
        Label::Fake => "Highlighted regions show texture and blending artifacts typical of synthesis.",
        Label::Real => "No concentrated manipulation regions highlighted.",
        Label::Error => "",
    }
}
