//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::http::header::CONTENT_RANGE;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use telestream_core::range::unsatisfied_content_range;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("range not satisfiable: start {start} beyond total length {total}")]
    RangeNotSatisfiable { start: u64, total: u64 },

    /// The media host failed during the playback probe or fetch. Always a
    /// 500 so the player retries rather than treating the video as gone.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("media error: {0}")]
    Media(#[from] telestream_media::MediaError),

    #[error("metadata error: {0}")]
    Metadata(#[from] telestream_metadata::MetadataError),

    #[error("core error: {0}")]
    Core(telestream_core::Error),
}

impl From<telestream_core::Error> for ApiError {
    fn from(err: telestream_core::Error) -> Self {
        match err {
            telestream_core::Error::RangeNotSatisfiable { start, total } => {
                Self::RangeNotSatisfiable { start, total }
            }
            other => Self::Core(other),
        }
    }
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::RangeNotSatisfiable { .. } => "range_not_satisfiable",
            Self::UpstreamFetch(_) => "upstream_fetch_failed",
            Self::Internal(_) => "internal_error",
            Self::Media(_) => "media_error",
            Self::Metadata(_) => "metadata_error",
            Self::Core(_) => "core_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::UpstreamFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Media(e) => match e {
                telestream_media::MediaError::NotFound(_) => StatusCode::NOT_FOUND,
                telestream_media::MediaError::InvalidKey(_)
                | telestream_media::MediaError::InvalidRange(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Metadata(e) => match e {
                telestream_metadata::MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
                telestream_metadata::MetadataError::AlreadyExists(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Core(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };

        // RFC 9110: a 416 carries Content-Range "bytes */<total>" so the
        // client learns the real object length.
        if let Self::RangeNotSatisfiable { total, .. } = &self {
            return (
                status,
                [(CONTENT_RANGE, unsatisfied_content_range(*total))],
                Json(body),
            )
                .into_response();
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
