//! User and subscription endpoints.

use crate::auth::require_auth;
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{UserResponse, read_json_body};
use crate::handlers::videos::VideoResponse;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use telestream_media::{MediaError, MediaKind};
use time::OffsetDateTime;
use uuid::Uuid;

/// Channel profile: the account, its subscriber count, and its videos.
#[derive(Debug, Serialize)]
pub struct ChannelResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub subscribers: u64,
    pub videos: Vec<VideoResponse>,
}

/// Profile update. Absent fields are left unchanged; immutable fields
/// (id, password, timestamps) have no spelling here at all.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
    pub channel: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub subscribed: bool,
    pub subscribers: u64,
}

/// GET /v1/users - List all accounts.
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.metadata.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /v1/users/{user_id} - Channel profile.
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<ChannelResponse>> {
    let user = state
        .metadata
        .get_user(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {user_id}")))?;
    let subscribers = state.metadata.count_subscribers(user_id).await?;

    let rows = state.metadata.list_videos_by_user(user_id).await?;
    let mut videos = Vec::with_capacity(rows.len());
    for row in rows {
        let likes = state.metadata.count_likes(row.video_id).await?;
        videos.push(VideoResponse::new(row, likes, user.channel.clone()));
    }

    Ok(Json(ChannelResponse {
        user: user.into(),
        subscribers,
        videos,
    }))
}

/// PATCH /v1/users/me - Update the caller's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<UserResponse>> {
    let auth = require_auth(&req)?.clone();
    let body: UpdateProfileRequest = read_json_body(req).await?;

    let mut user = auth.user;

    if let Some(username) = body.username {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(ApiError::BadRequest("username must not be blank".to_string()));
        }
        if username != user.username
            && state
                .metadata
                .get_user_by_username(&username)
                .await?
                .is_some()
        {
            return Err(ApiError::Conflict(format!(
                "username '{username}' already exists"
            )));
        }
        user.username = username;
    }

    if let Some(channel) = body.channel {
        let channel = channel.trim().to_string();
        if channel.is_empty() {
            return Err(ApiError::BadRequest("channel must not be blank".to_string()));
        }
        if channel != user.channel
            && state
                .metadata
                .get_user_by_channel(&channel)
                .await?
                .is_some()
        {
            return Err(ApiError::Conflict(format!(
                "channel '{channel}' already exists"
            )));
        }
        user.channel = channel;
    }

    if let Some(email) = body.email {
        let email = email.trim().to_string();
        if !email.contains('@') || !email.contains('.') {
            return Err(ApiError::BadRequest("invalid email address".to_string()));
        }
        if email != user.email
            && state.metadata.get_user_by_email(&email).await?.is_some()
        {
            return Err(ApiError::Conflict(format!("email '{email}' already exists")));
        }
        user.email = email;
    }

    user.updated_at = OffsetDateTime::now_utc();
    state.metadata.update_user(&user).await?;

    tracing::info!(user_id = %user.user_id, "Profile updated");
    Ok(Json(user.into()))
}

/// DELETE /v1/users/me - Delete the caller's account.
///
/// Media blobs of the user's videos are removed best-effort; the row delete
/// cascades sessions, subscriptions, likes, comments, and video records.
pub async fn delete_account(State(state): State<AppState>, req: Request) -> ApiResult<StatusCode> {
    let auth = require_auth(&req)?.clone();
    let user_id = auth.user.user_id;

    for video in state.metadata.list_videos_by_user(user_id).await? {
        for (public_id, kind) in [
            (&video.video_public_id, MediaKind::Video),
            (&video.thumbnail_public_id, MediaKind::Image),
        ] {
            match state.media.delete(public_id, kind).await {
                Ok(()) | Err(MediaError::NotFound(_)) => {}
                Err(e) => {
                    tracing::warn!(
                        video_id = %video.video_id,
                        public_id,
                        error = %e,
                        "Failed to delete media during account removal"
                    );
                }
            }
        }
    }

    state.metadata.delete_user(user_id).await?;
    tracing::info!(user_id = %user_id, "Account deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/users/{user_id}/subscribe - Subscribe to a channel.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<SubscriptionResponse>> {
    let auth = require_auth(&req)?.clone();

    if auth.user.user_id == channel_id {
        return Err(ApiError::BadRequest(
            "cannot subscribe to your own channel".to_string(),
        ));
    }
    if state.metadata.get_user(channel_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("user {channel_id}")));
    }

    let added = state
        .metadata
        .subscribe(auth.user.user_id, channel_id, OffsetDateTime::now_utc())
        .await?;
    if !added {
        return Err(ApiError::BadRequest(
            "already subscribed to this channel".to_string(),
        ));
    }

    let subscribers = state.metadata.count_subscribers(channel_id).await?;
    tracing::info!(
        subscriber = %auth.user.user_id,
        channel = %channel_id,
        "Subscription added"
    );
    Ok(Json(SubscriptionResponse {
        subscribed: true,
        subscribers,
    }))
}

/// POST /v1/users/{user_id}/unsubscribe - Unsubscribe from a channel.
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(channel_id): Path<Uuid>,
    req: Request,
) -> ApiResult<Json<SubscriptionResponse>> {
    let auth = require_auth(&req)?.clone();

    if state.metadata.get_user(channel_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("user {channel_id}")));
    }

    let removed = state
        .metadata
        .unsubscribe(auth.user.user_id, channel_id)
        .await?;
    if !removed {
        return Err(ApiError::BadRequest(
            "not subscribed to this channel".to_string(),
        ));
    }

    let subscribers = state.metadata.count_subscribers(channel_id).await?;
    Ok(Json(SubscriptionResponse {
        subscribed: false,
        subscribers,
    }))
}

/// GET /v1/users/me/subscriptions - Channels the caller is subscribed to.
pub async fn list_subscriptions(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let auth = require_auth(&req)?.clone();

    let channel_ids = state
        .metadata
        .list_subscribed_channels(auth.user.user_id)
        .await?;

    let mut channels = Vec::with_capacity(channel_ids.len());
    for channel_id in channel_ids {
        // Cascade deletes can race this listing; skip vanished channels.
        if let Some(user) = state.metadata.get_user(channel_id).await? {
            channels.push(user.into());
        }
    }
    Ok(Json(channels))
}
