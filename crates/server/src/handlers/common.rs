//! Shared handler utilities and response shapes.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Request, State};
use serde::Serialize;
use serde::de::DeserializeOwned;
use telestream_metadata::models::UserRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Cap on JSON request bodies. Media uploads go through multipart and are
/// limited separately.
pub(crate) const MAX_JSON_BODY_SIZE: usize = 64 * 1024;

/// Read and deserialize a JSON request body.
pub(crate) async fn read_json_body<T: DeserializeOwned>(req: Request) -> ApiResult<T> {
    let bytes = axum::body::to_bytes(req.into_body(), MAX_JSON_BODY_SIZE)
        .await
        .map_err(|e| ApiError::BadRequest(format!("failed to read body: {e}")))?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::BadRequest(format!("invalid JSON: {e}")))
}

/// Public view of a user account. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub channel: String,
    pub email: String,
    pub created_at: OffsetDateTime,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            username: row.username,
            channel: row.channel,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub media_backend: &'static str,
}

/// GET /v1/health - Service health.
/// Intentionally unauthenticated for load balancer probes.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state
        .metadata
        .health_check()
        .await
        .map_err(|e| ApiError::Internal(format!("metadata store unhealthy: {e}")))?;

    Ok(Json(HealthResponse {
        status: "ok",
        media_backend: state.media.backend_name(),
    }))
}
