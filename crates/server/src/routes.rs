//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, patch, post, put};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        // Health check (intentionally unauthenticated for load balancers/k8s probes)
        .route("/v1/health", get(handlers::health_check))
        // Accounts and sessions
        .route("/v1/auth/signup", post(handlers::signup))
        .route("/v1/auth/login", post(handlers::login))
        .route("/v1/auth/logout", post(handlers::logout))
        .route("/v1/auth/me", get(handlers::me))
        .route("/v1/auth/password", put(handlers::change_password))
        // Users and subscriptions
        .route("/v1/users", get(handlers::list_users))
        .route(
            "/v1/users/me",
            patch(handlers::update_profile).delete(handlers::delete_account),
        )
        .route(
            "/v1/users/me/subscriptions",
            get(handlers::list_subscriptions),
        )
        .route("/v1/users/{user_id}", get(handlers::get_user))
        .route("/v1/users/{user_id}/subscribe", post(handlers::subscribe))
        .route(
            "/v1/users/{user_id}/unsubscribe",
            post(handlers::unsubscribe),
        )
        // Video catalog. Static segments (play, search) take priority over
        // the {video_id} capture.
        .route(
            "/v1/videos",
            get(handlers::list_videos).post(handlers::upload_video),
        )
        .route("/v1/videos/play", get(handlers::play_video))
        .route("/v1/videos/search", get(handlers::search))
        .route(
            "/v1/videos/{video_id}",
            get(handlers::get_video).delete(handlers::delete_video),
        )
        .route("/v1/videos/{video_id}/like", post(handlers::toggle_like))
        .route("/v1/videos/{video_id}/view", post(handlers::record_view))
        .route(
            "/v1/videos/{video_id}/comments",
            get(handlers::list_comments),
        )
        // Comments
        .route("/v1/comments/{video_id}", post(handlers::create_comment));

    // Middleware layers are applied in reverse order (outermost first).
    // Order of execution: TraceLayer -> Auth -> body limit -> Handler
    router
        .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
