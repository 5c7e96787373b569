//! Byte-range parsing and chunk planning for the playback gateway.
//!
//! The gateway always serves a bounded chunk: the client tells us where to
//! start, and the chunk cap decides where we stop. A client-supplied end
//! offset is parsed for syntax validation but deliberately never used in the
//! plan, so a single request can never pull more than `chunk_cap` bytes from
//! the upstream host.

use crate::error::{Error, Result};

/// Default maximum number of bytes served per playback request: 1 MiB.
pub const DEFAULT_CHUNK_CAP: u64 = 1024 * 1024;

/// A parsed `Range` request header of the form `bytes=<start>-<end?>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte offset requested by the client.
    pub start: u64,
    /// Last byte offset, if the client supplied one. Retained for syntax
    /// validation only; chunk planning ignores it.
    pub end: Option<u64>,
}

impl ByteRange {
    /// Parse a `Range` header value.
    ///
    /// Only the single-range `bytes=<digits>-<digits?>` form is accepted.
    /// Suffix ranges (`bytes=-500`) and multi-range lists are rejected.
    pub fn parse(header: &str) -> Result<Self> {
        let malformed = || Error::InvalidRange(header.to_string());

        let range = header
            .trim()
            .strip_prefix("bytes=")
            .ok_or_else(malformed)?;

        let (start_str, end_str) = range.split_once('-').ok_or_else(malformed)?;

        if start_str.is_empty() || !start_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let start: u64 = start_str.parse().map_err(|_| malformed())?;

        let end = if end_str.is_empty() {
            None
        } else {
            if !end_str.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            Some(end_str.parse().map_err(|_| malformed())?)
        };

        Ok(Self { start, end })
    }
}

/// The resolved byte window for one playback response.
///
/// Invariant: `start <= end < total`, and `len() <= chunk_cap` for the cap the
/// plan was computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    /// First byte offset served (inclusive).
    pub start: u64,
    /// Last byte offset served (inclusive).
    pub end: u64,
    /// Total size of the upstream object.
    pub total: u64,
}

impl ChunkPlan {
    /// Compute the served window: `end = min(start + cap - 1, total - 1)`.
    ///
    /// Returns `RangeNotSatisfiable` when the object is empty or `start` lies
    /// beyond the last byte.
    pub fn compute(start: u64, total: u64, chunk_cap: u64) -> Result<Self> {
        debug_assert!(chunk_cap >= 1, "chunk cap must be validated at config load");

        if total == 0 || start > total - 1 {
            return Err(Error::RangeNotSatisfiable { start, total });
        }

        let end = start.saturating_add(chunk_cap - 1).min(total - 1);
        Ok(Self { start, end, total })
    }

    /// Number of bytes this plan serves.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Whether the plan serves zero bytes. Cannot happen for a computed plan;
    /// kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// `Content-Range` response header value: `bytes {start}-{end}/{total}`.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }

    /// `Range` header value for the upstream fetch: `bytes={start}-{end}`.
    pub fn upstream_range(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// `Content-Range` value for a 416 response: `bytes */{total}`.
pub fn unsatisfied_content_range(total: u64) -> String {
    format!("bytes */{total}")
}
