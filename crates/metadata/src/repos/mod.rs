//! Repository trait definitions.

pub mod comments;
pub mod sessions;
pub mod users;
pub mod videos;

pub use comments::CommentRepo;
pub use sessions::SessionRepo;
pub use users::UserRepo;
pub use videos::VideoRepo;
