//! Media type sniffing for uploads.
//!
//! Uses `infer` for content-based detection and `mime_guess` for
//! extension-based hints. Content wins when both are available.

use crate::core::MediaKind;
use std::path::Path;
use tracing::debug;

/// Where a media type came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SniffSource {
    Content,
    Extension,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    pub mime: String,
    pub kind: MediaKind,
    pub source: SniffSource,
}

const OCTET_STREAM: &str = "application/octet-stream";

/// Determine the media type of an upload from its bytes and client file name.
pub fn sniff(data: &[u8], filename: &str) -> MediaType {
    if let Some(kind) = infer::get(data) {
        debug!(mime = kind.mime_type(), "Upload type detected from content");
        return MediaType::new(kind.mime_type(), SniffSource::Content);
    }

    let guessed = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| mime_guess::from_ext(ext).first());
    match guessed {
        Some(mime) => {
            debug!(mime = %mime, "Upload type guessed from extension");
            MediaType::new(mime.essence_str(), SniffSource::Extension)
        }
        None => MediaType::new(OCTET_STREAM, SniffSource::Fallback),
    }
}

impl MediaType {
    fn new(mime: &str, source: SniffSource) -> Self {
        Self {
            mime: mime.to_string(),
            kind: MediaKind::from_mime(mime),
            source,
        }
    }
}
