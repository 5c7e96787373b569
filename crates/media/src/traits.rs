//! Media host trait definitions.

use crate::error::MediaResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of bytes for streaming ranged fetches.
pub type ByteStream = Pin<Box<dyn Stream<Item = MediaResult<Bytes>> + Send>>;

/// What kind of media object an upload or delete refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    /// File extension for stored objects of this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Image => "jpg",
        }
    }

    /// Stable identifier used in upstream API calls.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Image => "image",
        }
    }
}

/// Size metadata learned from a bodyless probe.
#[derive(Clone, Debug)]
pub struct MediaMeta {
    /// Total object size in bytes.
    pub total_size: u64,
    /// Content type reported by the host (if any).
    pub content_type: Option<String>,
}

/// Result of uploading a media buffer.
#[derive(Clone, Debug)]
pub struct UploadedMedia {
    /// Host-assigned identifier used for later deletion.
    pub public_id: String,
    /// Publicly fetchable URL (or key, for the filesystem backend).
    pub url: String,
}

/// Media host abstraction.
///
/// Constructed once at startup and injected into the server state, so
/// handlers can be exercised against a fake host in tests.
#[async_trait]
pub trait MediaStore: Send + Sync + 'static {
    /// Learn an object's total size without downloading payload bytes.
    async fn probe(&self, url: &str) -> MediaResult<MediaMeta>;

    /// Fetch the inclusive byte window `[start, end]` as a stream.
    ///
    /// Implementations must not buffer the full window before yielding;
    /// the downstream writer paces the upstream read.
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> MediaResult<ByteStream>;

    /// Upload a buffer, returning its public identifier and URL.
    async fn upload(&self, data: Bytes, folder: &str, kind: MediaKind) -> MediaResult<UploadedMedia>;

    /// Delete an uploaded object.
    async fn delete(&self, public_id: &str, kind: MediaKind) -> MediaResult<()>;

    /// Get the name of this media backend ("http", "filesystem").
    /// Used for logging.
    fn backend_name(&self) -> &'static str;

    /// Verify the media host is reachable.
    ///
    /// Called during startup so misconfiguration surfaces before the server
    /// accepts playback requests.
    async fn health_check(&self) -> MediaResult<()> {
        Ok(())
    }
}
