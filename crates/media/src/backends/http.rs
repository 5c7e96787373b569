//! Remote HTTP media host backend.
//!
//! Speaks plain HTTP to the hosting service: HEAD for the metadata probe,
//! GET with a `Range` header for the bounded fetch, multipart POST for
//! uploads. The client carries explicit connect and request timeouts so a
//! stalled host can never wedge a playback handler.

use crate::error::{MediaError, MediaResult};
use crate::traits::{ByteStream, MediaKind, MediaMeta, MediaStore, UploadedMedia};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::Url;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE, RANGE};
use serde::Deserialize;
use std::time::Duration;
use tracing::instrument;

/// HTTP-backed media store.
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
}

/// Upload response returned by the media host.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    url: String,
}

impl HttpBackend {
    /// Create a new HTTP backend.
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> MediaResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| MediaError::Config(format!("invalid media base_url: {e}")))?;

        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            api_key,
        })
    }

    fn api_url(&self, path: &str) -> MediaResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| MediaError::Config(format!("failed to build media API URL: {e}")))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    fn check_status(url: &str, status: reqwest::StatusCode) -> MediaResult<()> {
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MediaError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(MediaError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MediaStore for HttpBackend {
    #[instrument(skip(self), fields(backend = "http"))]
    async fn probe(&self, url: &str) -> MediaResult<MediaMeta> {
        let response = self.http.head(url).send().await?;
        Self::check_status(url, response.status())?;

        let total_size = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .ok_or_else(|| MediaError::InvalidLength(url.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(MediaMeta {
            total_size,
            content_type,
        })
    }

    #[instrument(skip(self), fields(backend = "http"))]
    async fn fetch_range(&self, url: &str, start: u64, end: u64) -> MediaResult<ByteStream> {
        if end < start {
            return Err(MediaError::InvalidRange(format!(
                "end ({end}) < start ({start})"
            )));
        }

        let response = self
            .http
            .get(url)
            .header(RANGE, format!("bytes={start}-{end}"))
            .send()
            .await?;
        Self::check_status(url, response.status())?;

        // reqwest yields the body incrementally; dropping the stream (client
        // disconnect) aborts the upstream transfer.
        let stream = response.bytes_stream().map(|r| r.map_err(MediaError::from));
        Ok(Box::pin(stream))
    }

    #[instrument(skip(self, data), fields(backend = "http", len = data.len()))]
    async fn upload(
        &self,
        data: Bytes,
        folder: &str,
        kind: MediaKind,
    ) -> MediaResult<UploadedMedia> {
        let url = self.api_url("upload")?;

        let part = reqwest::multipart::Part::stream(data)
            .file_name(format!("upload.{}", kind.extension()));
        let form = reqwest::multipart::Form::new()
            .text("folder", folder.to_string())
            .text("kind", kind.as_str())
            .part("file", part);

        let response = self
            .authorize(self.http.post(url.clone()))
            .multipart(form)
            .send()
            .await?;
        Self::check_status(url.as_str(), response.status())?;

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::Decode(e.to_string()))?;

        Ok(UploadedMedia {
            public_id: uploaded.public_id,
            url: uploaded.url,
        })
    }

    #[instrument(skip(self), fields(backend = "http"))]
    async fn delete(&self, public_id: &str, kind: MediaKind) -> MediaResult<()> {
        let mut url = self.api_url(&format!("media/{public_id}"))?;
        url.query_pairs_mut().append_pair("kind", kind.as_str());

        let response = self.authorize(self.http.delete(url.clone())).send().await?;
        Self::check_status(url.as_str(), response.status())
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn health_check(&self) -> MediaResult<()> {
        // Any response proves the host is reachable; an auth-gated 401 here
        // is not a connectivity failure.
        self.http.head(self.base_url.clone()).send().await?;
        Ok(())
    }
}
