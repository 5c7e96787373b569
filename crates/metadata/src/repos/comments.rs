//! Comment repository.

use crate::error::MetadataResult;
use crate::models::CommentRow;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository for video comments.
#[async_trait]
pub trait CommentRepo: Send + Sync {
    /// Create a comment.
    async fn create_comment(&self, comment: &CommentRow) -> MetadataResult<()>;

    /// List a video's comments, oldest first.
    async fn list_comments_for_video(&self, video_id: Uuid) -> MetadataResult<Vec<CommentRow>>;
}
