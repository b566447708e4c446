//! SVG heatmap overlay renderer.
//!
//! Hot regions are derived from a SHA-256 of the image's file name, so the
//! same upload name always produces the same overlay.

use super::HeatmapRenderer;
use crate::core::Label;
use crate::error::ExplainError;
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Number of hot regions drawn per overlay.
const REGIONS: usize = 3;

/// Writes `heatmap_<stem>.svg` (or `heatmap_<stem>_<variant>.svg`) next to the
/// image, or into `output_dir` when set.
#[derive(Debug, Clone, Default)]
pub struct OverlayRenderer {
    pub output_dir: Option<PathBuf>,
}

impl OverlayRenderer {
    pub fn with_output_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: Some(dir.into()),
        }
    }

    fn target_path(&self, image: &Path, variant: Option<&str>) -> Result<PathBuf, ExplainError> {
        let stem = image
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ExplainError::InvalidPath(image.to_path_buf()))?;
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => image.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let file = match variant {
            Some(variant) => format!("heatmap_{stem}_{variant}.svg"),
            None => format!("heatmap_{stem}.svg"),
        };
        Ok(dir.join(file))
    }
}

impl HeatmapRenderer for OverlayRenderer {
    fn render(
        &self,
        image: &Path,
        label: Label,
        variant: Option<&str>,
    ) -> Result<PathBuf, ExplainError> {
        if !image.is_file() {
            return Err(ExplainError::MissingImage(image.to_path_buf()));
        }
        let target = self.target_path(image, variant)?;
        let name = image
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let svg = overlay_svg(&name, label);
        std::fs::write(&target, svg).map_err(|source| ExplainError::Write {
            path: target.clone(),
            source,
        })?;
        trace!(target = %target.display(), "Overlay written");
        Ok(target)
    }

    fn name(&self) -> &str {
        "svg-overlay"
    }
}

/// Build the overlay document for a file name and label.
pub fn overlay_svg(file_name: &str, label: Label) -> String {
    let digest = Sha256::digest(file_name.as_bytes());
    let (color, opacity) = match label {
        Label::Fake => ("#ff2d2d", 0.65),
        Label::Real => ("#2d8cff", 0.35),
        Label::Error => ("#9e9e9e", 0.2),
    };

    let mut svg = String::from(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 100" preserveAspectRatio="none">"#,
    );
    let _ = write!(
        svg,
        r#"<defs><radialGradient id="hot"><stop offset="0%" stop-color="{color}" stop-opacity="{opacity}"/><stop offset="100%" stop-color="{color}" stop-opacity="0"/></radialGradient></defs>"#
    );
    // Three bytes per region: x, y, radius.
    for chunk in digest.chunks(3).take(REGIONS) {
        let cx = 15 + u32::from(chunk[0]) % 70;
        let cy = 15 + u32::from(chunk[1]) % 70;
        let r = 8 + u32::from(chunk[2]) % 17;
        let _ = write!(svg, r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="url(#hot)"/>"#);
    }
    let _ = write!(svg, r#"<desc>{} {}</desc></svg>"#, label, hex::encode(&digest[..4]));
    svg
}
