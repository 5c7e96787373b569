//! Metadata store abstraction and SQLite implementation for TeleStream.
//!
//! This crate provides the control-plane data model:
//! - User accounts and channel subscriptions
//! - Video records, views, and likes
//! - Comments
//! - Login sessions

pub mod error;
pub mod models;
pub mod repos;
pub mod store;

pub use error::{MetadataError, MetadataResult};
pub use store::{MetadataStore, SqliteStore};

use std::sync::Arc;
use telestream_core::config::MetadataConfig;

/// Create a metadata store from configuration.
pub async fn from_config(config: &MetadataConfig) -> MetadataResult<Arc<dyn MetadataStore>> {
    match config {
        MetadataConfig::Sqlite { path } => {
            let store = SqliteStore::new(path).await?;
            Ok(Arc::new(store) as Arc<dyn MetadataStore>)
        }
    }
}
