//! Upload and stored-file records exchanged with the storage collaborator.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Raw upload as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-supplied file name (untrusted).
    pub filename: String,
    pub bytes: Bytes,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Coarse media category of a stored upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Other,
}

impl MediaKind {
    pub fn from_mime(mime: &str) -> Self {
        match mime.split('/').next() {
            Some("image") => MediaKind::Image,
            Some("video") => MediaKind::Video,
            Some("audio") => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }
}

/// Persisted upload. The orchestrator only relies on `local_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: Uuid,
    pub original_name: String,
    pub stored_name: String,
    pub local_path: PathBuf,
    pub size_bytes: u64,
    pub sha256: String,
    pub content_type: String,
    pub media_kind: MediaKind,
    pub uploaded_at: DateTime<Utc>,
}

impl StoredFile {
    pub fn local_path(&self) -> &Path {
        &self.local_path
    }
}
