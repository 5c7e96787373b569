//! Video catalog endpoints: upload, listing, search, likes, views, delete.

use crate::auth::require_auth;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::UserResponse;
use crate::state::AppState;
use axum::Json;
use axum::extract::{FromRequest, Multipart, Path, Query, Request, State};
use axum::http::StatusCode;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use telestream_media::{MediaError, MediaKind};
use telestream_metadata::models::VideoRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Public view of a video record.
#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub video_id: Uuid,
    pub user_id: Uuid,
    /// Uploader's channel display name, denormalized for listings.
    pub channel: String,
    pub title: String,
    pub description: Option<String>,
    pub video_url: String,
    pub thumbnail_url: String,
    pub views: i64,
    pub likes: u64,
    pub created_at: OffsetDateTime,
}

impl VideoResponse {
    pub(crate) fn new(row: VideoRow, likes: u64, channel: String) -> Self {
        Self {
            video_id: row.video_id,
            user_id: row.user_id,
            channel,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            views: row.views,
            likes,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: u64,
}

#[derive(Debug, Serialize)]
pub struct ViewResponse {
    pub views: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub videos: Vec<VideoResponse>,
    pub channels: Vec<UserResponse>,
}

async fn video_response(state: &AppState, row: VideoRow) -> ApiResult<VideoResponse> {
    let likes = state.metadata.count_likes(row.video_id).await?;
    let channel = state
        .metadata
        .get_user(row.user_id)
        .await?
        .map(|u| u.channel)
        .unwrap_or_else(|| "[deleted]".to_string());
    Ok(VideoResponse::new(row, likes, channel))
}

async fn require_video(state: &AppState, video_id: Uuid) -> ApiResult<VideoRow> {
    state
        .metadata
        .get_video(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("video {video_id}")))
}

/// GET /v1/videos - All videos, newest first.
pub async fn list_videos(State(state): State<AppState>) -> ApiResult<Json<Vec<VideoResponse>>> {
    let rows = state.metadata.list_videos().await?;
    let mut videos = Vec::with_capacity(rows.len());
    for row in rows {
        videos.push(video_response(&state, row).await?);
    }
    Ok(Json(videos))
}

/// GET /v1/videos/{video_id} - A single video.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
) -> ApiResult<Json<VideoResponse>> {
    let row = require_video(&state, video_id).await?;
    Ok(Json(video_response(&state, row).await?))
}

/// POST /v1/videos - Upload a video with its thumbnail.
///
/// Multipart fields: `title` (required), `description` (optional), `video`
/// (required file), `thumbnail` (required file).
pub async fn upload_video(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<VideoResponse>)> {
    let auth = require_auth(&req)?.clone();

    let mut multipart = Multipart::from_request(req, &state)
        .await
        .map_err(|e| ApiError::BadRequest(format!("expected multipart body: {e}")))?;

    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut video_data: Option<Bytes> = None;
    let mut thumbnail_data: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart field: {e}")))?
    {
        match field.name() {
            Some("title") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid title field: {e}")))?;
                title = Some(text);
            }
            Some("description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("invalid description field: {e}")))?;
                if !text.trim().is_empty() {
                    description = Some(text);
                }
            }
            Some("video") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read video: {e}")))?;
                video_data = Some(data);
            }
            Some("thumbnail") => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read thumbnail: {e}")))?;
                thumbnail_data = Some(data);
            }
            _ => {}
        }
    }

    let title = title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;
    let video_data = video_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("video file is required".to_string()))?;
    let thumbnail_data = thumbnail_data
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::BadRequest("thumbnail file is required".to_string()))?;

    let video = state
        .media
        .upload(video_data, "videos", MediaKind::Video)
        .await?;

    let thumbnail = match state
        .media
        .upload(thumbnail_data, "thumbnails", MediaKind::Image)
        .await
    {
        Ok(uploaded) => uploaded,
        Err(e) => {
            // Don't strand the video blob when the thumbnail upload fails.
            cleanup_media(&state, &video.public_id, MediaKind::Video).await;
            return Err(e.into());
        }
    };

    let now = OffsetDateTime::now_utc();
    let row = VideoRow {
        video_id: Uuid::new_v4(),
        user_id: auth.user.user_id,
        title,
        description,
        video_url: video.url,
        video_public_id: video.public_id,
        thumbnail_url: thumbnail.url,
        thumbnail_public_id: thumbnail.public_id,
        views: 0,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = state.metadata.create_video(&row).await {
        cleanup_media(&state, &row.video_public_id, MediaKind::Video).await;
        cleanup_media(&state, &row.thumbnail_public_id, MediaKind::Image).await;
        return Err(e.into());
    }

    tracing::info!(
        video_id = %row.video_id,
        user_id = %auth.user.user_id,
        backend = state.media.backend_name(),
        "Video uploaded"
    );
    Ok((
        StatusCode::CREATED,
        Json(VideoResponse::new(row, 0, auth.user.channel)),
    ))
}

/// Best-effort media deletion during upload rollback.
async fn cleanup_media(state: &AppState, public_id: &str, kind: MediaKind) {
    if let Err(e) = state.media.delete(public_id, kind).await {
        tracing::warn!(public_id, error = %e, "Failed to clean up media after aborted upload");
    }
}

/// DELETE /v1/videos/{video_id} - Delete a video and its media.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
    req: Request,
) -> ApiResult<StatusCode> {
    let auth = require_auth(&req)?.clone();
    let row = require_video(&state, video_id).await?;

    if row.user_id != auth.user.user_id {
        return Err(ApiError::Forbidden(
            "only the owner can delete a video".to_string(),
        ));
    }

    // Media deletes run first so a failure leaves the record findable for a
    // retry. A missing blob is fine; the record is still removed.
    for (public_id, kind) in [
        (&row.video_public_id, MediaKind::Video),
        (&row.thumbnail_public_id, MediaKind::Image),
    ] {
        match state.media.delete(public_id, kind).await {
            Ok(()) | Err(MediaError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    state.metadata.delete_video(video_id).await?;
    tracing::info!(video_id = %video_id, user_id = %auth.user.user_id, "Video deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/videos/{video_id}/like - Toggle the caller's like.
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<LikeResponse>> {
    let auth = require_auth(&req)?.clone();
    require_video(&state, video_id).await?;

    let user_id = auth.user.user_id;
    let liked = if state
        .metadata
        .add_like(user_id, video_id, OffsetDateTime::now_utc())
        .await?
    {
        true
    } else {
        state.metadata.remove_like(user_id, video_id).await?;
        false
    };

    let likes = state.metadata.count_likes(video_id).await?;
    Ok(Json(LikeResponse { liked, likes }))
}

/// POST /v1/videos/{video_id}/view - Record a playback view.
pub async fn record_view(
    State(state): State<AppState>,
    Path(video_id): Path<Uuid>,
) -> ApiResult<Json<ViewResponse>> {
    let row = state
        .metadata
        .increment_views(video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("video {video_id}")))?;
    Ok(Json(ViewResponse { views: row.views }))
}

/// GET /v1/videos/search?keyword= - Search titles and channel names.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<SearchResponse>> {
    let keyword = params
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::BadRequest("keyword is required".to_string()))?;

    let video_rows = state.metadata.search_videos(keyword).await?;
    let channel_rows = state.metadata.search_channels(keyword).await?;

    if video_rows.is_empty() && channel_rows.is_empty() {
        return Err(ApiError::NotFound(format!(
            "no videos or channels match '{keyword}'"
        )));
    }

    let mut videos = Vec::with_capacity(video_rows.len());
    for row in video_rows {
        videos.push(video_response(&state, row).await?);
    }

    Ok(Json(SearchResponse {
        videos,
        channels: channel_rows.into_iter().map(UserResponse::from).collect(),
    }))
}
