//! Core data types for the scan pipeline.
//!
//! These are the values that flow between the detector, the explainer, the
//! notifier and the orchestrator: detection outcomes, alert payloads and the
//! upload/stored-file records exchanged with storage.

pub mod alert;
pub mod outcome;
pub mod upload;

pub use alert::{AlertPayload, AlertType, Severity};
pub use outcome::{DetectionOutcome, Label, Tier};
pub use upload::{MediaKind, StoredFile, Upload};
