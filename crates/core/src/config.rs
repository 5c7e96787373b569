//! Configuration types shared across crates.

use crate::range::DEFAULT_CHUNK_CAP;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum bytes served per playback request.
    /// The client's requested end offset is never honored beyond this cap.
    #[serde(default = "default_chunk_cap")]
    pub chunk_cap: u64,
    /// Session token lifetime in seconds.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    /// Interval in seconds between sweeps of expired sessions.
    /// Zero disables the sweeper.
    #[serde(default = "default_session_sweep_interval_secs")]
    pub session_sweep_interval_secs: u64,
    /// Maximum accepted multipart upload size in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_chunk_cap() -> u64 {
    DEFAULT_CHUNK_CAP
}

fn default_session_ttl_secs() -> u64 {
    crate::DEFAULT_SESSION_TTL_SECS
}

fn default_session_sweep_interval_secs() -> u64 {
    3600
}

fn default_max_upload_bytes() -> usize {
    crate::DEFAULT_MAX_UPLOAD_BYTES
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            chunk_cap: default_chunk_cap(),
            session_ttl_secs: default_session_ttl_secs(),
            session_sweep_interval_secs: default_session_sweep_interval_secs(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Get the session lifetime as a Duration.
    pub fn session_ttl(&self) -> time::Duration {
        let secs = i64::try_from(self.session_ttl_secs).unwrap_or(i64::MAX);
        time::Duration::seconds(secs)
    }

    /// Get the session sweep interval, or None if disabled.
    pub fn session_sweep_interval(&self) -> Option<Duration> {
        if self.session_sweep_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.session_sweep_interval_secs))
        }
    }

    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_cap == 0 {
            return Err("server.chunk_cap must be at least 1 byte".to_string());
        }
        if self.session_ttl_secs == 0 {
            return Err("server.session_ttl_secs must be at least 1 second".to_string());
        }
        Ok(())
    }
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database.
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/metadata.db"),
        }
    }
}

/// Media host configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MediaConfig {
    /// Local filesystem media root (development and tests).
    Filesystem {
        /// Root directory for stored media objects.
        path: PathBuf,
    },
    /// Remote HTTP media host.
    Http {
        /// Base URL of the media host API (uploads and deletes).
        base_url: String,
        /// API key sent as a bearer token. Falls back to the
        /// TELESTREAM_MEDIA_API_KEY env var if not set.
        /// WARNING: Prefer env vars over storing secrets in config files.
        api_key: Option<String>,
        /// Connect timeout in seconds for upstream calls.
        #[serde(default = "default_connect_timeout_secs")]
        connect_timeout_secs: u64,
        /// Overall timeout in seconds for the metadata probe and for the
        /// ranged fetch's response headers. The body stream itself is paced
        /// by the client.
        #[serde(default = "default_request_timeout_secs")]
        request_timeout_secs: u64,
    },
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./data/media"),
        }
    }
}

impl MediaConfig {
    /// Validate media configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MediaConfig::Filesystem { .. } => Ok(()),
            MediaConfig::Http {
                base_url,
                connect_timeout_secs,
                request_timeout_secs,
                ..
            } => {
                if base_url.is_empty() {
                    return Err("media.base_url must not be empty".to_string());
                }
                if *connect_timeout_secs == 0 || *request_timeout_secs == 0 {
                    return Err(
                        "media timeouts must be at least 1 second (untimed upstream calls \
                         can hang the playback handler)"
                            .to_string(),
                    );
                }
                Ok(())
            }
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
    /// Media host configuration.
    #[serde(default)]
    pub media: MediaConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem media and SQLite metadata.
    pub fn for_testing() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_defaults_use_one_mib_cap() {
        let config = ServerConfig::default();
        assert_eq!(config.chunk_cap, 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_chunk_cap_is_rejected() {
        let config = ServerConfig {
            chunk_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_sweep_interval_disables_sweeper() {
        let config = ServerConfig {
            session_sweep_interval_secs: 0,
            ..Default::default()
        };
        assert!(config.session_sweep_interval().is_none());
    }

    #[test]
    fn http_media_config_requires_timeouts() {
        let config = MediaConfig::Http {
            base_url: "https://media.example.com".to_string(),
            api_key: None,
            connect_timeout_secs: 0,
            request_timeout_secs: 30,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn media_config_deserializes_tagged() {
        let json = r#"{"type":"http","base_url":"https://media.example.com"}"#;
        let config: MediaConfig = serde_json::from_str(json).unwrap();
        match config {
            MediaConfig::Http {
                connect_timeout_secs,
                request_timeout_secs,
                ..
            } => {
                assert_eq!(connect_timeout_secs, 5);
                assert_eq!(request_timeout_secs, 30);
            }
            _ => panic!("expected http config"),
        }
    }
}
