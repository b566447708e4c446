//! Filename heuristic used by the mock tier.

use crate::core::Label;
use rand::Rng;
use std::path::Path;

/// Label implied by a file name: anything mentioning "real" (any case) is REAL.
pub fn label_for_name(path: &Path) -> Label {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains("real") {
        Label::Real
    } else {
        Label::Fake
    }
}

/// Sample a score uniformly from an inclusive range, tolerating reversed bounds.
///
/// Bounds are clamped to `[0, 100]` first; a NaN bound counts as 0.
pub fn sample_score<R: Rng + ?Sized>(rng: &mut R, range: (f64, f64)) -> f64 {
    let range = (percent(range.0), percent(range.1));
    let (lo, hi) = if range.0 <= range.1 {
        range
    } else {
        (range.1, range.0)
    };
    if lo == hi {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

fn percent(bound: f64) -> f64 {
    if bound.is_nan() {
        0.0
    } else {
        bound.clamp(0.0, 100.0)
    }
}
