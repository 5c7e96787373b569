//! A scripted media host for gateway tests.

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use telestream_media::{
    ByteStream, MediaError, MediaKind, MediaMeta, MediaResult, MediaStore, UploadedMedia,
};

/// Media store double that records upstream call counts and can be told to
/// fail the ranged fetch.
pub struct MockMediaStore {
    total_size: u64,
    pub probe_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    fail_probe: AtomicBool,
    fail_fetch: AtomicBool,
}

#[allow(dead_code)]
impl MockMediaStore {
    pub fn new(total_size: u64) -> Arc<Self> {
        Arc::new(Self {
            total_size,
            probe_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            fail_probe: AtomicBool::new(false),
            fail_fetch: AtomicBool::new(false),
        })
    }

    /// Make probes fail with NotFound.
    pub fn fail_probe(&self) {
        self.fail_probe.store(true, Ordering::SeqCst);
    }

    /// Make ranged fetches fail after a successful probe.
    pub fn fail_fetch(&self) {
        self.fail_fetch.store(true, Ordering::SeqCst);
    }

    pub fn probes(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn probe(&self, url: &str) -> MediaResult<MediaMeta> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_probe.load(Ordering::SeqCst) {
            return Err(MediaError::NotFound(url.to_string()));
        }
        Ok(MediaMeta {
            total_size: self.total_size,
            content_type: Some("video/mp4".to_string()),
        })
    }

    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> MediaResult<ByteStream> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(MediaError::Upstream {
                status: 502,
                url: url.to_string(),
            });
        }

        // Emit the inclusive window in bounded chunks, like a real host would.
        let mut remaining = end - start + 1;
        let mut chunks = Vec::new();
        while remaining > 0 {
            let n = remaining.min(64 * 1024) as usize;
            chunks.push(Ok(Bytes::from(vec![0u8; n])));
            remaining -= n as u64;
        }
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        kind: MediaKind,
    ) -> MediaResult<UploadedMedia> {
        let _ = data;
        let key = format!("{folder}/mock.{}", kind.extension());
        Ok(UploadedMedia {
            public_id: key.clone(),
            url: key,
        })
    }

    async fn delete(&self, _public_id: &str, _kind: MediaKind) -> MediaResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}
