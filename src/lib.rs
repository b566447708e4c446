//! Media manipulation scanning with tiered fallback and real-time alerts.
//!
//! An upload is stored, classified as REAL or FAKE, explained with a heatmap
//! and, when FAKE, announced to every connected observer. Detection falls
//! back from a lazily loaded model to a filename heuristic to a fixed
//! safe-mode verdict, so a caller always gets a label and a score unless the
//! upload itself cannot be stored.

/// Core data types module
pub mod core;

pub mod config;
pub mod detector;
pub mod error;
pub mod explain;
pub mod logging;
pub mod notify;
pub mod scan;
pub mod storage;
pub mod timeout;

pub use crate::config::ScanConfig;
pub use crate::core::{AlertPayload, DetectionOutcome, Label, StoredFile, Tier, Upload};
pub use detector::{Detector, DetectorState, DetectorStatus};
pub use error::{ScanError, StorageError};
pub use explain::Explainer;
pub use notify::{ChannelObserver, Notifier, Observer, ObserverId};
pub use scan::{ScanResponse, Scanner};
pub use storage::{LocalStorage, Storage};
