//! Media host error types.

use thiserror::Error;

/// Media host operation errors.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media object not found: {0}")]
    NotFound(String),

    #[error("upstream returned status {status} for {url}")]
    Upstream { status: u16, url: String },

    #[error("upstream length missing or unparseable for {0}")]
    InvalidLength(String),

    #[error("invalid media key: {0}")]
    InvalidKey(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("upstream HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("upstream response decode error: {0}")]
    Decode(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for media operations.
pub type MediaResult<T> = std::result::Result<T, MediaError>;
