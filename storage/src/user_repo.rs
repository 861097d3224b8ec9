//! User repository: upserts and lookups for the `users` table.
//!
//! Uses SqlitePoolManager and the user models. Callers treat these as
//! opaque async operations; the user-tracking middleware calls `upsert`
//! best-effort on every update.

use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::models::{StoredUser, UserRecord};
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    /// Wraps an existing pool and creates the `users` table if needed.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT,
                first_name TEXT,
                last_name TEXT,
                language_code TEXT,
                is_premium INTEGER NOT NULL DEFAULT 0,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_last_seen ON users(last_seen)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Inserts the user or refreshes the profile fields. `first_seen` is
    /// written once and kept on conflict; `last_seen` always refreshes.
    pub async fn upsert(&self, record: &UserRecord) -> Result<StoredUser, StorageError> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, StoredUser>(
            r#"
            INSERT INTO users (id, username, first_name, last_name, language_code, is_premium, first_seen, last_seen)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                language_code = excluded.language_code,
                is_premium = excluded.is_premium,
                last_seen = excluded.last_seen
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.username)
        .bind(&record.first_name)
        .bind(&record.last_name)
        .bind(&record.language_code)
        .bind(record.is_premium)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool_manager.pool())
        .await?;

        info!(user_id = record.id, "Upserted user");
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<Option<StoredUser>, StorageError> {
        let user = sqlx::query_as::<_, StoredUser>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(user)
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(row.0)
    }
}
