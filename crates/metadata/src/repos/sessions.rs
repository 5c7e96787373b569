//! Login session repository.

use crate::error::MetadataResult;
use crate::models::SessionRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for login sessions.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    /// Create a session.
    async fn create_session(&self, session: &SessionRow) -> MetadataResult<()>;

    /// Get a session by token hash.
    async fn get_session_by_hash(&self, token_hash: &str) -> MetadataResult<Option<SessionRow>>;

    /// Revoke a session.
    async fn revoke_session(
        &self,
        session_id: Uuid,
        revoked_at: OffsetDateTime,
    ) -> MetadataResult<()>;

    /// Delete sessions that are expired or revoked as of `now`.
    /// Returns the number of rows removed.
    async fn delete_expired_sessions(&self, now: OffsetDateTime) -> MetadataResult<u64>;
}
