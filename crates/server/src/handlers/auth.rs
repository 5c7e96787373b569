//! Account and session endpoints.

use crate::auth::{generate_session_token, hash_token, require_auth};
use crate::error::{ApiError, ApiResult};
use crate::handlers::common::{UserResponse, read_json_body};
use crate::state::AppState;
use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use telestream_core::password::{hash_password, verify_password};
use telestream_metadata::models::{SessionRow, UserRow};
use time::OffsetDateTime;
use uuid::Uuid;

/// Minimum accepted password length.
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub channel: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub identity: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests. Shown once; only its hash is
    /// stored.
    pub token: String,
    pub expires_at: OffsetDateTime,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

fn validate_password(password: &str) -> ApiResult<()> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// POST /v1/auth/signup - Create an account.
pub async fn signup(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let body: SignupRequest = read_json_body(req).await?;

    let username = body.username.trim();
    let channel = body.channel.trim();
    let email = body.email.trim();

    if username.is_empty() || channel.is_empty() || email.is_empty() {
        return Err(ApiError::BadRequest(
            "username, channel, and email are required".to_string(),
        ));
    }
    if !email.contains('@') || !email.contains('.') {
        return Err(ApiError::BadRequest("invalid email address".to_string()));
    }
    validate_password(&body.password)?;

    let now = OffsetDateTime::now_utc();
    let user = UserRow {
        user_id: Uuid::new_v4(),
        username: username.to_string(),
        channel: channel.to_string(),
        email: email.to_string(),
        password_hash: hash_password(&body.password),
        created_at: now,
        updated_at: now,
    };

    // AlreadyExists maps to 409 via the error type.
    state.metadata.create_user(&user).await?;

    tracing::info!(user_id = %user.user_id, username = %user.username, "User created");
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// POST /v1/auth/login - Exchange credentials for a session token.
pub async fn login(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<Json<LoginResponse>> {
    let body: LoginRequest = read_json_body(req).await?;
    let identity = body.identity.trim();

    // Accept either an email address or a username in one field.
    let user = if identity.contains('@') && identity.contains('.') {
        state.metadata.get_user_by_email(identity).await?
    } else {
        state.metadata.get_user_by_username(identity).await?
    };

    // Same error for unknown identity and wrong password, so login failures
    // cannot be used to enumerate accounts.
    let invalid = || ApiError::Unauthorized("invalid credentials".to_string());
    let user = user.ok_or_else(invalid)?;

    let verified = verify_password(&body.password, &user.password_hash)
        .map_err(|e| ApiError::Internal(format!("stored password hash invalid: {e}")))?;
    if !verified {
        return Err(invalid());
    }

    let now = OffsetDateTime::now_utc();
    let token = generate_session_token();
    let session = SessionRow {
        session_id: Uuid::new_v4(),
        user_id: user.user_id,
        token_hash: hash_token(&token),
        created_at: now,
        expires_at: now + state.config.server.session_ttl(),
        revoked_at: None,
    };
    state.metadata.create_session(&session).await?;

    tracing::info!(user_id = %user.user_id, "User logged in");
    Ok(Json(LoginResponse {
        token,
        expires_at: session.expires_at,
        user: user.into(),
    }))
}

/// POST /v1/auth/logout - Revoke the current session.
pub async fn logout(State(state): State<AppState>, req: Request) -> ApiResult<StatusCode> {
    let auth = require_auth(&req)?.clone();

    state
        .metadata
        .revoke_session(auth.session_id, OffsetDateTime::now_utc())
        .await?;

    tracing::info!(user_id = %auth.user.user_id, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/auth/me - Current account.
pub async fn me(req: Request) -> ApiResult<Json<UserResponse>> {
    let auth = require_auth(&req)?;
    Ok(Json(auth.user.clone().into()))
}

/// PUT /v1/auth/password - Change the current account's password.
pub async fn change_password(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<StatusCode> {
    let auth = require_auth(&req)?.clone();
    let body: ChangePasswordRequest = read_json_body(req).await?;

    let verified = verify_password(&body.current_password, &auth.user.password_hash)
        .map_err(|e| ApiError::Internal(format!("stored password hash invalid: {e}")))?;
    if !verified {
        return Err(ApiError::Unauthorized(
            "current password is incorrect".to_string(),
        ));
    }
    validate_password(&body.new_password)?;

    state
        .metadata
        .update_password(
            auth.user.user_id,
            &hash_password(&body.new_password),
            OffsetDateTime::now_utc(),
        )
        .await?;

    tracing::info!(user_id = %auth.user.user_id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}
