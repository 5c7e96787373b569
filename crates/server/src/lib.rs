//! TeleStream HTTP API server.
//!
//! Exposes the account, catalog, and comment endpoints plus the playback
//! gateway that streams capped byte ranges from the media host.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
