//! Group repository: upserts and lookups for the `groups` table.

use chrono::Utc;
use tracing::info;

use crate::error::StorageError;
use crate::models::{GroupRecord, StoredGroup};
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct GroupRepository {
    pool_manager: SqlitePoolManager,
}

impl GroupRepository {
    /// Wraps an existing pool and creates the `groups` table if needed.
    pub async fn new(pool_manager: SqlitePoolManager) -> Result<Self, StorageError> {
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS groups (
                id INTEGER PRIMARY KEY,
                kind TEXT NOT NULL,
                title TEXT,
                first_seen TEXT NOT NULL,
                last_seen TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_groups_last_seen ON groups(last_seen)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Inserts the group or refreshes kind/title. `first_seen` is kept on
    /// conflict; `last_seen` always refreshes.
    pub async fn upsert(&self, record: &GroupRecord) -> Result<StoredGroup, StorageError> {
        let now = Utc::now();

        let group = sqlx::query_as::<_, StoredGroup>(
            r#"
            INSERT INTO groups (id, kind, title, first_seen, last_seen)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                kind = excluded.kind,
                title = excluded.title,
                last_seen = excluded.last_seen
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(&record.kind)
        .bind(&record.title)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool_manager.pool())
        .await?;

        info!(group_id = record.id, "Upserted group");
        Ok(group)
    }

    pub async fn get(&self, id: i64) -> Result<Option<StoredGroup>, StorageError> {
        let group = sqlx::query_as::<_, StoredGroup>("SELECT * FROM groups WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(group)
    }

    pub async fn count(&self) -> Result<i64, StorageError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM groups")
            .fetch_one(self.pool_manager.pool())
            .await?;
        Ok(row.0)
    }
}
