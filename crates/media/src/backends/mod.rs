//! Media host backend implementations.

pub mod filesystem;
pub mod http;
