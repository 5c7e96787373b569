//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// Users
// =============================================================================

/// User account record. `username`, `channel`, and `email` are each unique.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub username: String,
    /// Channel display name shown on videos and comments.
    pub channel: String,
    pub email: String,
    /// Salted hash; never serialized out of the API layer.
    pub password_hash: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

// =============================================================================
// Videos
// =============================================================================

/// Video record. The payload lives on the media host; only URLs and the
/// host-assigned public ids are stored here.
#[derive(Debug, Clone, FromRow)]
pub struct VideoRow {
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub video_public_id: String,
    pub thumbnail_url: String,
    pub thumbnail_public_id: String,
    pub views: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

// =============================================================================
// Comments
// =============================================================================

/// Comment on a video.
#[derive(Debug, Clone, FromRow)]
pub struct CommentRow {
    pub comment_id: Uuid,
    pub video_id: Uuid,
    pub user_id: Uuid,
    pub body: String,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Sessions
// =============================================================================

/// Login session. The raw token is only ever held by the client; we store its
/// SHA-256 hash.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
    pub revoked_at: Option<OffsetDateTime>,
}

impl SessionRow {
    /// Whether the session is usable at `now`.
    pub fn is_valid(&self, now: OffsetDateTime) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}
