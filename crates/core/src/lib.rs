//! Core domain types and shared logic for the TeleStream backend.
//!
//! This crate defines what the other crates agree on:
//! - Byte-range parsing and chunk planning for the playback gateway
//! - Application configuration
//! - Password hashing helpers
//! - The core error enum

pub mod config;
pub mod error;
pub mod password;
pub mod range;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use range::{ByteRange, ChunkPlan, DEFAULT_CHUNK_CAP};

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 60 * 60;

/// Default cap on multipart upload size: 256 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 256 * 1024 * 1024;
