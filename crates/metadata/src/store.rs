//! Metadata store trait and SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::{CommentRepo, SessionRepo, UserRepo, VideoRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: UserRepo + VideoRepo + CommentRepo + SessionRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id       BLOB PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    channel       TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at    TEXT NOT NULL,
    updated_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS videos (
    video_id            BLOB PRIMARY KEY,
    user_id             BLOB NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    title               TEXT NOT NULL,
    description         TEXT,
    video_url           TEXT NOT NULL,
    video_public_id     TEXT NOT NULL,
    thumbnail_url       TEXT NOT NULL,
    thumbnail_public_id TEXT NOT NULL,
    views               INTEGER NOT NULL DEFAULT 0,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_videos_user ON videos(user_id);

CREATE TABLE IF NOT EXISTS comments (
    comment_id BLOB PRIMARY KEY,
    video_id   BLOB NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    user_id    BLOB NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    body       TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_comments_video ON comments(video_id);

CREATE TABLE IF NOT EXISTS sessions (
    session_id BLOB PRIMARY KEY,
    user_id    BLOB NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    token_hash TEXT NOT NULL UNIQUE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    revoked_at TEXT
);

CREATE TABLE IF NOT EXISTS subscriptions (
    subscriber_id BLOB NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    channel_id    BLOB NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at    TEXT NOT NULL,
    PRIMARY KEY (subscriber_id, channel_id)
);
CREATE INDEX IF NOT EXISTS idx_subscriptions_channel ON subscriptions(channel_id);

CREATE TABLE IF NOT EXISTS video_likes (
    user_id    BLOB NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    video_id   BLOB NOT NULL REFERENCES videos(video_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, video_id)
);
CREATE INDEX IF NOT EXISTS idx_video_likes_video ON video_likes(video_id);
"#;

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Create a new SQLite store and run migrations.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under axum concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Implement all the repository traits for SqliteStore
mod sqlite_impl {
    use super::*;
    use crate::models::{CommentRow, SessionRow, UserRow, VideoRow};
    use time::OffsetDateTime;
    use uuid::Uuid;

    /// Build a LIKE pattern that matches the keyword as a literal substring,
    /// with `%`, `_`, and the escape character itself escaped.
    fn like_pattern(keyword: &str) -> String {
        let escaped = keyword
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    }

    #[async_trait]
    impl UserRepo for SqliteStore {
        async fn create_user(&self, user: &UserRow) -> MetadataResult<()> {
            if self.get_user_by_username(&user.username).await?.is_some() {
                return Err(MetadataError::AlreadyExists(format!(
                    "username '{}' already exists",
                    user.username
                )));
            }
            if self.get_user_by_channel(&user.channel).await?.is_some() {
                return Err(MetadataError::AlreadyExists(format!(
                    "channel '{}' already exists",
                    user.channel
                )));
            }
            if self.get_user_by_email(&user.email).await?.is_some() {
                return Err(MetadataError::AlreadyExists(format!(
                    "email '{}' already exists",
                    user.email
                )));
            }

            sqlx::query(
                "INSERT INTO users (user_id, username, channel, email, password_hash, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(user.user_id)
            .bind(&user.username)
            .bind(&user.channel)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_user(&self, user_id: Uuid) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_email(&self, email: &str) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_channel(&self, channel: &str) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE channel = ?")
                .bind(channel)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_users(&self) -> MetadataResult<Vec<UserRow>> {
            let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn update_user(&self, user: &UserRow) -> MetadataResult<()> {
            let result = sqlx::query(
                "UPDATE users SET username = ?, channel = ?, email = ?, updated_at = ? \
                 WHERE user_id = ?",
            )
            .bind(&user.username)
            .bind(&user.channel)
            .bind(&user.email)
            .bind(user.updated_at)
            .bind(user.user_id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!("user {}", user.user_id)));
            }
            Ok(())
        }

        async fn update_password(
            &self,
            user_id: Uuid,
            password_hash: &str,
            updated_at: OffsetDateTime,
        ) -> MetadataResult<()> {
            let result =
                sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE user_id = ?")
                    .bind(password_hash)
                    .bind(updated_at)
                    .bind(user_id)
                    .execute(&self.pool)
                    .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!("user {user_id}")));
            }
            Ok(())
        }

        async fn delete_user(&self, user_id: Uuid) -> MetadataResult<()> {
            let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
                .bind(user_id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!("user {user_id}")));
            }
            Ok(())
        }

        async fn subscribe(
            &self,
            subscriber_id: Uuid,
            channel_id: Uuid,
            now: OffsetDateTime,
        ) -> MetadataResult<bool> {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO subscriptions (subscriber_id, channel_id, created_at) \
                 VALUES (?, ?, ?)",
            )
            .bind(subscriber_id)
            .bind(channel_id)
            .bind(now)
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn unsubscribe(
            &self,
            subscriber_id: Uuid,
            channel_id: Uuid,
        ) -> MetadataResult<bool> {
            let result =
                sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?")
                    .bind(subscriber_id)
                    .bind(channel_id)
                    .execute(&self.pool)
                    .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn is_subscribed(
            &self,
            subscriber_id: Uuid,
            channel_id: Uuid,
        ) -> MetadataResult<bool> {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?)",
            )
            .bind(subscriber_id)
            .bind(channel_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(exists)
        }

        async fn count_subscribers(&self, channel_id: Uuid) -> MetadataResult<u64> {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?")
                    .bind(channel_id)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count as u64)
        }

        async fn list_subscribed_channels(&self, subscriber_id: Uuid) -> MetadataResult<Vec<Uuid>> {
            let rows: Vec<Uuid> = sqlx::query_scalar(
                "SELECT channel_id FROM subscriptions WHERE subscriber_id = ? ORDER BY created_at",
            )
            .bind(subscriber_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn search_channels(&self, keyword: &str) -> MetadataResult<Vec<UserRow>> {
            let rows = sqlx::query_as::<_, UserRow>(
                "SELECT * FROM users WHERE channel LIKE ? ESCAPE '\\' ORDER BY channel",
            )
            .bind(like_pattern(keyword))
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }

    #[async_trait]
    impl VideoRepo for SqliteStore {
        async fn create_video(&self, video: &VideoRow) -> MetadataResult<()> {
            sqlx::query(
                "INSERT INTO videos (video_id, user_id, title, description, video_url, \
                 video_public_id, thumbnail_url, thumbnail_public_id, views, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(video.video_id)
            .bind(video.user_id)
            .bind(&video.title)
            .bind(&video.description)
            .bind(&video.video_url)
            .bind(&video.video_public_id)
            .bind(&video.thumbnail_url)
            .bind(&video.thumbnail_public_id)
            .bind(video.views)
            .bind(video.created_at)
            .bind(video.updated_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_video(&self, video_id: Uuid) -> MetadataResult<Option<VideoRow>> {
            let row = sqlx::query_as::<_, VideoRow>("SELECT * FROM videos WHERE video_id = ?")
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_videos(&self) -> MetadataResult<Vec<VideoRow>> {
            let rows =
                sqlx::query_as::<_, VideoRow>("SELECT * FROM videos ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?;
            Ok(rows)
        }

        async fn list_videos_by_user(&self, user_id: Uuid) -> MetadataResult<Vec<VideoRow>> {
            let rows = sqlx::query_as::<_, VideoRow>(
                "SELECT * FROM videos WHERE user_id = ? ORDER BY created_at DESC",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn delete_video(&self, video_id: Uuid) -> MetadataResult<()> {
            let result = sqlx::query("DELETE FROM videos WHERE video_id = ?")
                .bind(video_id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!("video {video_id}")));
            }
            Ok(())
        }

        async fn increment_views(&self, video_id: Uuid) -> MetadataResult<Option<VideoRow>> {
            let result = sqlx::query("UPDATE videos SET views = views + 1 WHERE video_id = ?")
                .bind(video_id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Ok(None);
            }
            self.get_video(video_id).await
        }

        async fn add_like(
            &self,
            user_id: Uuid,
            video_id: Uuid,
            now: OffsetDateTime,
        ) -> MetadataResult<bool> {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO video_likes (user_id, video_id, created_at) VALUES (?, ?, ?)",
            )
            .bind(user_id)
            .bind(video_id)
            .bind(now)
            .execute(&self.pool)
            .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn remove_like(&self, user_id: Uuid, video_id: Uuid) -> MetadataResult<bool> {
            let result =
                sqlx::query("DELETE FROM video_likes WHERE user_id = ? AND video_id = ?")
                    .bind(user_id)
                    .bind(video_id)
                    .execute(&self.pool)
                    .await?;
            Ok(result.rows_affected() > 0)
        }

        async fn has_liked(&self, user_id: Uuid, video_id: Uuid) -> MetadataResult<bool> {
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM video_likes WHERE user_id = ? AND video_id = ?)",
            )
            .bind(user_id)
            .bind(video_id)
            .fetch_one(&self.pool)
            .await?;
            Ok(exists)
        }

        async fn count_likes(&self, video_id: Uuid) -> MetadataResult<u64> {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM video_likes WHERE video_id = ?")
                    .bind(video_id)
                    .fetch_one(&self.pool)
                    .await?;
            Ok(count as u64)
        }

        async fn search_videos(&self, keyword: &str) -> MetadataResult<Vec<VideoRow>> {
            let rows = sqlx::query_as::<_, VideoRow>(
                "SELECT * FROM videos WHERE title LIKE ? ESCAPE '\\' ORDER BY created_at DESC",
            )
            .bind(like_pattern(keyword))
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }

    #[async_trait]
    impl CommentRepo for SqliteStore {
        async fn create_comment(&self, comment: &CommentRow) -> MetadataResult<()> {
            sqlx::query(
                "INSERT INTO comments (comment_id, video_id, user_id, body, created_at) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(comment.comment_id)
            .bind(comment.video_id)
            .bind(comment.user_id)
            .bind(&comment.body)
            .bind(comment.created_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn list_comments_for_video(
            &self,
            video_id: Uuid,
        ) -> MetadataResult<Vec<CommentRow>> {
            let rows = sqlx::query_as::<_, CommentRow>(
                "SELECT * FROM comments WHERE video_id = ? ORDER BY created_at",
            )
            .bind(video_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }
    }

    #[async_trait]
    impl SessionRepo for SqliteStore {
        async fn create_session(&self, session: &SessionRow) -> MetadataResult<()> {
            sqlx::query(
                "INSERT INTO sessions (session_id, user_id, token_hash, created_at, expires_at, revoked_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(session.session_id)
            .bind(session.user_id)
            .bind(&session.token_hash)
            .bind(session.created_at)
            .bind(session.expires_at)
            .bind(session.revoked_at)
            .execute(&self.pool)
            .await?;
            Ok(())
        }

        async fn get_session_by_hash(
            &self,
            token_hash: &str,
        ) -> MetadataResult<Option<SessionRow>> {
            let row =
                sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE token_hash = ?")
                    .bind(token_hash)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }

        async fn revoke_session(
            &self,
            session_id: Uuid,
            revoked_at: OffsetDateTime,
        ) -> MetadataResult<()> {
            let result = sqlx::query("UPDATE sessions SET revoked_at = ? WHERE session_id = ?")
                .bind(revoked_at)
                .bind(session_id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(MetadataError::NotFound(format!("session {session_id}")));
            }
            Ok(())
        }

        async fn delete_expired_sessions(&self, now: OffsetDateTime) -> MetadataResult<u64> {
            let result =
                sqlx::query("DELETE FROM sessions WHERE expires_at <= ? OR revoked_at IS NOT NULL")
                    .bind(now)
                    .execute(&self.pool)
                    .await?;
            Ok(result.rows_affected())
        }
    }
}
