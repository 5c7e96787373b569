//! Local filesystem media backend.
//!
//! Media "URLs" are keys relative to the configured root. Used in
//! development and in the integration tests; the semantics mirror the HTTP
//! backend: probe returns the byte size, ranged fetches stream the inclusive
//! window without loading it whole.

use crate::error::{MediaError, MediaResult};
use crate::traits::{ByteStream, MediaKind, MediaMeta, MediaStore, UploadedMedia};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::instrument;
use uuid::Uuid;

/// Read size for streamed fetches.
const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// Filesystem-backed media store.
pub struct FilesystemBackend {
    root: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend rooted at `root`.
    pub async fn new(root: impl AsRef<Path>) -> MediaResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Resolve a media key to a path under the root.
    /// Rejects absolute keys and parent traversal.
    fn key_path(&self, key: &str) -> MediaResult<PathBuf> {
        let key = key.trim_start_matches('/');
        if key.is_empty() {
            return Err(MediaError::InvalidKey("empty key".to_string()));
        }
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(MediaError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

fn not_found(key: &str, e: std::io::Error) -> MediaError {
    if e.kind() == std::io::ErrorKind::NotFound {
        MediaError::NotFound(key.to_string())
    } else {
        MediaError::Io(e)
    }
}

#[async_trait]
impl MediaStore for FilesystemBackend {
    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn probe(&self, url: &str) -> MediaResult<MediaMeta> {
        let path = self.key_path(url)?;
        let meta = fs::metadata(&path).await.map_err(|e| not_found(url, e))?;
        Ok(MediaMeta {
            total_size: meta.len(),
            content_type: None,
        })
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> MediaResult<ByteStream> {
        if end < start {
            return Err(MediaError::InvalidRange(format!(
                "end ({end}) < start ({start})"
            )));
        }

        let path = self.key_path(url)?;
        let mut file = fs::File::open(&path).await.map_err(|e| not_found(url, e))?;
        file.seek(std::io::SeekFrom::Start(start)).await?;

        let mut remaining = end - start + 1;

        // Stream the window in bounded reads instead of buffering it whole.
        let stream = async_stream::try_stream! {
            let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
            while remaining > 0 {
                let want = remaining.min(STREAM_CHUNK_SIZE as u64) as usize;
                let n = file.read(&mut buf[..want]).await?;
                if n == 0 {
                    // Object shrank under us; surface a short read instead of
                    // padding the response.
                    Err(std::io::Error::new(
                        std::io::ErrorKind::UnexpectedEof,
                        "media object ended before requested range",
                    ))?;
                }
                remaining -= n as u64;
                yield Bytes::copy_from_slice(&buf[..n]);
            }
        };

        Ok(Box::pin(stream))
    }

    #[instrument(skip(self, data), fields(backend = "filesystem", len = data.len()))]
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        kind: MediaKind,
    ) -> MediaResult<UploadedMedia> {
        let key = format!("{folder}/{}.{}", Uuid::new_v4(), kind.extension());
        let path = self.key_path(&key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a temp name then rename so a crashed upload never leaves a
        // half-written object at the final key.
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &path).await?;

        Ok(UploadedMedia {
            public_id: key.clone(),
            url: key,
        })
    }

    #[instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, public_id: &str, _kind: MediaKind) -> MediaResult<()> {
        let path = self.key_path(public_id)?;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found(public_id, e))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
