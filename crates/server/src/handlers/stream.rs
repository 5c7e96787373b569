//! The playback gateway: ranged, capped streaming from the media host.
//!
//! Request flow for `GET /v1/videos/play`:
//! 1. `url` query parameter and `Range` header are both required; either one
//!    missing is a 400 before any upstream call is made.
//! 2. The media host is probed for the object's total size. Any probe
//!    failure, including the host not knowing the object, surfaces as a 500
//!    upstream error.
//! 3. The served window is `[start, min(start + chunk_cap - 1, total - 1)]`.
//!    The client's end offset, if present, is syntax-checked and then
//!    ignored; the cap alone bounds how much one request can pull upstream.
//! 4. The window is fetched with an upstream `Range` header and streamed
//!    through as a `206 Partial Content` body. The body is never buffered in
//!    full, and dropping the response (client disconnect) drops the upstream
//!    stream with it.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header::{ACCEPT_RANGES, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, RANGE};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde::Deserialize;
use telestream_core::range::{ByteRange, ChunkPlan};

#[derive(Debug, Deserialize)]
pub struct PlayParams {
    /// Upstream object URL (or key, for the filesystem backend).
    pub url: Option<String>,
}

/// GET /v1/videos/play?url=... - Stream one capped chunk of a video.
pub async fn play_video(
    State(state): State<AppState>,
    Query(params): Query<PlayParams>,
    headers: HeaderMap,
) -> ApiResult<Response> {
    let url = params
        .url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("url query parameter is required".to_string()))?;

    let range_header = headers
        .get(RANGE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Range header is required".to_string()))?;

    let range = ByteRange::parse(range_header)?;

    // Both upstream stages report failure as a 500; by the time the gateway
    // talks to the media host the request itself has already been validated.
    let meta = state.media.probe(&url).await.map_err(|e| {
        tracing::error!(url = %url, error = %e, "Upstream probe failed");
        ApiError::UpstreamFetch(e.to_string())
    })?;
    let plan = ChunkPlan::compute(range.start, meta.total_size, state.config.server.chunk_cap)?;

    let stream = state
        .media
        .fetch_range(&url, plan.start, plan.end)
        .await
        .map_err(|e| {
            tracing::error!(url = %url, error = %e, "Ranged fetch failed after successful probe");
            ApiError::UpstreamFetch(e.to_string())
        })?;

    tracing::debug!(
        url = %url,
        start = plan.start,
        end = plan.end,
        total = plan.total,
        "Serving playback chunk"
    );

    let body_stream = stream.map(|result| result.map_err(std::io::Error::other));

    Ok((
        StatusCode::PARTIAL_CONTENT,
        [
            (CONTENT_TYPE, "video/mp4".to_string()),
            (CONTENT_LENGTH, plan.len().to_string()),
            (CONTENT_RANGE, plan.content_range()),
            (ACCEPT_RANGES, "bytes".to_string()),
        ],
        Body::from_stream(body_stream),
    )
        .into_response())
}
