//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;
use telestream_core::config::AppConfig;
use telestream_media::MediaStore;
use telestream_metadata::MetadataStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Media host backend.
    pub media: Arc<dyn MediaStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Panics
    ///
    /// Panics if configuration validation fails. Validation runs before the
    /// listener binds, so a bad config never serves traffic.
    pub fn new(
        config: AppConfig,
        media: Arc<dyn MediaStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        if let Err(error) = config.server.validate() {
            panic!("Invalid server configuration: {}", error);
        }
        if let Err(error) = config.media.validate() {
            panic!("Invalid media configuration: {}", error);
        }

        Self {
            config: Arc::new(config),
            media,
            metadata,
        }
    }

    /// Get the session sweeper interval, if enabled.
    pub fn session_sweep_interval(&self) -> Option<Duration> {
        self.config.server.session_sweep_interval()
    }
}

/// Spawn the background task that deletes expired and revoked sessions.
pub fn spawn_session_sweeper(state: AppState, interval: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // First tick fires immediately; skip it so startup stays quiet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            match state
                .metadata
                .delete_expired_sessions(time::OffsetDateTime::now_utc())
                .await
            {
                Ok(0) => {}
                Ok(removed) => {
                    tracing::info!(removed, "Swept expired sessions");
                }
                Err(error) => {
                    tracing::error!(error = %error, "Session sweep failed");
                }
            }
        }
    });
}
