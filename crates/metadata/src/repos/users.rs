//! User and subscription repository.

use crate::error::MetadataResult;
use crate::models::UserRow;
use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

/// Repository for user accounts and channel subscriptions.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a user. Fails with `AlreadyExists` if the username, channel, or
    /// email is taken.
    async fn create_user(&self, user: &UserRow) -> MetadataResult<()>;

    /// Get a user by id.
    async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>>;

    /// Get a user by username.
    async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>>;

    /// Get a user by email.
    async fn get_user_by_email(&self, email: &str) -> MetadataResult<Option<UserRow>>;

    /// Get a user by channel name.
    async fn get_user_by_channel(&self, channel: &str) -> MetadataResult<Option<UserRow>>;

    /// List all users.
    async fn list_users(&self) -> MetadataResult<Vec<UserRow>>;

    /// Update username, channel, and email. Uniqueness checks are the
    /// caller's responsibility; the unique indexes are the backstop.
    async fn update_user(&self, user: &UserRow) -> MetadataResult<()>;

    /// Replace a user's password hash.
    async fn update_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
        updated_at: OffsetDateTime,
    ) -> MetadataResult<()>;

    /// Delete a user and (via cascade) their sessions, subscriptions, likes,
    /// comments, and video rows.
    async fn delete_user(&self, user_id: Uuid) -> MetadataResult<()>;

    /// Subscribe `subscriber_id` to `channel_id`.
    /// Returns false if the subscription already existed.
    async fn subscribe(
        &self,
        subscriber_id: Uuid,
        channel_id: Uuid,
        now: OffsetDateTime,
    ) -> MetadataResult<bool>;

    /// Remove a subscription. Returns false if none existed.
    async fn unsubscribe(&self, subscriber_id: Uuid, channel_id: Uuid) -> MetadataResult<bool>;

    /// Whether `subscriber_id` is subscribed to `channel_id`.
    async fn is_subscribed(&self, subscriber_id: Uuid, channel_id: Uuid) -> MetadataResult<bool>;

    /// Number of subscribers of a channel.
    async fn count_subscribers(&self, channel_id: Uuid) -> MetadataResult<u64>;

    /// Channels a user is subscribed to.
    async fn list_subscribed_channels(&self, subscriber_id: Uuid) -> MetadataResult<Vec<Uuid>>;

    /// Case-insensitive substring search over channel names.
    async fn search_channels(&self, keyword: &str) -> MetadataResult<Vec<UserRow>>;
}
