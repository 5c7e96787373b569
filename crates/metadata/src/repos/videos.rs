//! Video and like repository.

use crate::error::MetadataResult;
use crate::models::VideoRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for video records and like state.
#[async_trait]
pub trait VideoRepo: Send + Sync {
    /// Create a video record.
    async fn create_video(&self, video: &VideoRow) -> MetadataResult<()>;

    /// Get a video by id.
    async fn get_video(&self, video_id: Uuid) -> MetadataResult<Option<VideoRow>>;

    /// List all videos, newest first.
    async fn list_videos(&self) -> MetadataResult<Vec<VideoRow>>;

    /// List a user's videos, newest first.
    async fn list_videos_by_user(&self, user_id: Uuid) -> MetadataResult<Vec<VideoRow>>;

    /// Delete a video row (likes and comments cascade).
    async fn delete_video(&self, video_id: Uuid) -> MetadataResult<()>;

    /// Atomically bump the view counter. Returns the updated row, or None if
    /// the video does not exist.
    async fn increment_views(&self, video_id: Uuid) -> MetadataResult<Option<VideoRow>>;

    /// Record a like. Returns false if the user had already liked the video.
    async fn add_like(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        now: OffsetDateTime,
    ) -> MetadataResult<bool>;

    /// Remove a like. Returns false if none existed.
    async fn remove_like(&self, user_id: Uuid, video_id: Uuid) -> MetadataResult<bool>;

    /// Whether the user has liked the video.
    async fn has_liked(&self, user_id: Uuid, video_id: Uuid) -> MetadataResult<bool>;

    /// Number of likes on a video.
    async fn count_likes(&self, video_id: Uuid) -> MetadataResult<u64>;

    /// Case-insensitive substring search over titles.
    async fn search_videos(&self, keyword: &str) -> MetadataResult<Vec<VideoRow>>;
}
