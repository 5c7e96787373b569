//! HTTP request handlers.

pub mod auth;
pub mod comments;
pub mod common;
pub mod stream;
pub mod users;
pub mod videos;

pub use auth::*;
pub use comments::*;
pub use common::*;
pub use stream::*;
pub use users::*;
pub use videos::*;
