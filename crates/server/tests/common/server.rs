//! Server test utilities.

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use telestream_core::config::{AppConfig, MediaConfig, MetadataConfig};
use telestream_media::{FilesystemBackend, MediaStore};
use telestream_metadata::{MetadataStore, SqliteStore};
use telestream_server::{AppState, create_router};
use tempfile::TempDir;
use uuid::Uuid;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a test server backed by temp filesystem media and SQLite.
    pub async fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let media_path = temp_dir.path().join("media");
        let media: Arc<dyn MediaStore> = Arc::new(
            FilesystemBackend::new(&media_path)
                .await
                .expect("Failed to create media backend"),
        );

        Self::build(temp_dir, media).await
    }

    /// Create a test server using a caller-supplied media store (e.g. the
    /// scripted mock for gateway tests).
    pub async fn with_media(media: Arc<dyn MediaStore>) -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        Self::build(temp_dir, media).await
    }

    async fn build(temp_dir: TempDir, media: Arc<dyn MediaStore>) -> Self {
        let db_path = temp_dir.path().join("metadata.db");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );

        let config = AppConfig {
            server: Default::default(),
            metadata: MetadataConfig::Sqlite {
                path: db_path.clone(),
            },
            media: MediaConfig::Filesystem {
                path: temp_dir.path().join("media"),
            },
        };

        let state = AppState::new(config, media, metadata);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying metadata store.
    pub fn metadata(&self) -> Arc<dyn MetadataStore> {
        self.state.metadata.clone()
    }

    /// Sign up and log in a user; returns (token, user_id).
    pub async fn signup_and_login(&self, name: &str) -> (String, Uuid) {
        let signup = super::send(
            &self.router,
            "POST",
            "/v1/auth/signup",
            None,
            Some(json!({
                "username": name,
                "channel": format!("{name}-channel"),
                "email": format!("{name}@example.com"),
                "password": "correct horse",
            })),
        )
        .await;
        assert_eq!(signup.status(), StatusCode::CREATED);
        let user = super::body_json(signup).await;
        let user_id: Uuid = user["user_id"].as_str().unwrap().parse().unwrap();

        let login = super::send(
            &self.router,
            "POST",
            "/v1/auth/login",
            None,
            Some(json!({ "identity": name, "password": "correct horse" })),
        )
        .await;
        assert_eq!(login.status(), StatusCode::OK);
        let body = super::body_json(login).await;
        let token = body["token"].as_str().unwrap().to_string();

        (token, user_id)
    }
}
