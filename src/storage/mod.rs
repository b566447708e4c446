//! Upload persistence.
//!
//! The orchestrator depends only on the [`Storage`] trait. [`LocalStorage`]
//! writes uploads into a directory that is also served under the uploads
//! route, which is where heatmaps end up as well.

pub mod sniff;

use crate::config::StorageConfig;
use crate::core::{StoredFile, Upload};
use crate::error::StorageError;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Storage collaborator: persist an upload and describe where it went.
pub trait Storage: Send + Sync {
    fn save(&self, upload: Upload) -> impl Future<Output = Result<StoredFile, StorageError>> + Send;
}

/// Stores uploads on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
    max_upload_bytes: u64,
}

impl LocalStorage {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            root: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn io_error(path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Storage for LocalStorage {
    async fn save(&self, upload: Upload) -> Result<StoredFile, StorageError> {
        if upload.is_empty() {
            warn!(filename = %upload.filename, "Rejecting empty upload");
            return Err(StorageError::EmptyUpload);
        }
        let size = upload.len() as u64;
        if size > self.max_upload_bytes {
            warn!(filename = %upload.filename, size, limit = self.max_upload_bytes, "Upload too large");
            return Err(StorageError::TooLarge {
                limit: self.max_upload_bytes,
                found: size,
            });
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| Self::io_error(&self.root, e))?;

        let id = Uuid::new_v4();
        let original_name = base_name(&upload.filename);
        let stored_name = format!("{}_{}", id.simple(), sanitize(&original_name));
        let local_path = self.root.join(&stored_name);

        tokio::fs::write(&local_path, &upload.bytes)
            .await
            .map_err(|e| Self::io_error(&local_path, e))?;

        let media = sniff::sniff(&upload.bytes, &original_name);
        let sha256 = hex::encode(Sha256::digest(&upload.bytes));
        info!(
            path = %local_path.display(),
            size,
            content_type = %media.mime,
            "Upload stored"
        );

        Ok(StoredFile {
            id,
            original_name,
            stored_name,
            local_path,
            size_bytes: size,
            sha256,
            content_type: media.mime,
            media_kind: media.kind,
            uploaded_at: Utc::now(),
        })
    }
}

/// Last path component of a client-supplied name, accepting either separator.
fn base_name(name: &str) -> String {
    name.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
}

/// Keep a file name safe to place on disk and in a URL.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
