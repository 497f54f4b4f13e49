//! Damage photos attached to a claim

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::PhotoId;

/// A stored damage photo
///
/// Owned by exactly one claim; the binary lives behind `uri` in whatever
/// store the photo ingestion adapter writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: PhotoId,
    pub uri: String,
    pub filename: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl Photo {
    /// Creates a photo descriptor for freshly stored content
    pub fn new(
        id: PhotoId,
        uri: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            id,
            uri: uri.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            size_bytes,
            uploaded_at: Utc::now(),
        }
    }
}

/// Guesses an image content type from a filename extension
pub fn content_type_for(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "heic" => Some("image/heic"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
