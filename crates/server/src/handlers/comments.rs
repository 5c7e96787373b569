//! Comment endpoints.

use crate::auth::require_auth;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::read_json_body;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use telestream_metadata::models::CommentRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub comment_id: Uuid,
    pub video_id: Uuid,
    pub user_id: Uuid,
    /// Channel name of the commenter, denormalized for display.
    pub channel: String,
    pub body: String,
    pub created_at: OffsetDateTime,
}

/// POST /v1/comments/{video_id} - Comment on a video.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
    req: Request,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let auth = require_auth(&req)?.clone();
    let body: CreateCommentRequest = read_json_body(req).await?;

    let text = body.body.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("comment body is required".to_string()));
    }

    if state.metadata.get_video(video_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("video {video_id}")));
    }

    let comment = CommentRow {
        comment_id: Uuid::new_v4(),
        video_id,
        user_id: auth.user.user_id,
        body: text.to_string(),
        created_at: OffsetDateTime::now_utc(),
    };
    state.metadata.create_comment(&comment).await?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            comment_id: comment.comment_id,
            video_id: comment.video_id,
            user_id: comment.user_id,
            channel: auth.user.channel,
            body: comment.body,
            created_at: comment.created_at,
        }),
    ))
}

/// GET /v1/videos/{video_id}/comments - A video's comments, oldest first.
pub async fn list_comments(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    if state.metadata.get_video(video_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("video {video_id}")));
    }

    let rows = state.metadata.list_comments_for_video(video_id).await?;
    let mut comments = Vec::with_capacity(rows.len());
    for row in rows {
        let channel = state
            .metadata
            .get_user(row.user_id)
            .await?
            .map(|u| u.channel)
            .unwrap_or_else(|| "[deleted]".to_string());
        comments.push(CommentResponse {
            comment_id: row.comment_id,
            video_id: row.video_id,
            user_id: row.user_id,
            channel,
            body: row.body,
            created_at: row.created_at,
        });
    }
    Ok(Json(comments))
}
