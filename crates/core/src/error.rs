//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid range header: {0}")]
    InvalidRange(String),

    #[error("range not satisfiable: start {start} beyond total length {total}")]
    RangeNotSatisfiable { start: u64, total: u64 },

    #[error("invalid password hash: {0}")]
    InvalidPasswordHash(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
