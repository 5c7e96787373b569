//! Media host abstraction and backends for TeleStream.
//!
//! This crate provides:
//! - The `MediaStore` trait: bodyless size probe, bounded ranged fetch as a
//!   byte stream, buffer upload, delete
//! - Backends: remote HTTP host (with explicit timeouts) and local filesystem

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{filesystem::FilesystemBackend, http::HttpBackend};
pub use error::{MediaError, MediaResult};
pub use traits::{ByteStream, MediaKind, MediaMeta, MediaStore, UploadedMedia};

use std::sync::Arc;
use std::time::Duration;
use telestream_core::config::MediaConfig;

/// Create a media store from configuration.
pub async fn from_config(config: &MediaConfig) -> MediaResult<Arc<dyn MediaStore>> {
    config.validate().map_err(MediaError::Config)?;

    match config {
        MediaConfig::Filesystem { path } => {
            let backend = FilesystemBackend::new(path).await?;
            Ok(Arc::new(backend))
        }
        MediaConfig::Http {
            base_url,
            api_key,
            connect_timeout_secs,
            request_timeout_secs,
        } => {
            let api_key = api_key
                .clone()
                .or_else(|| std::env::var("TELESTREAM_MEDIA_API_KEY").ok());
            let backend = HttpBackend::new(
                base_url,
                api_key,
                Duration::from_secs(*connect_timeout_secs),
                Duration::from_secs(*request_timeout_secs),
            )?;
            Ok(Arc::new(backend))
        }
    }
}
