//! Group row models for persistence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upsert input for a group or channel chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: i64,
    /// Chat kind as reported by the transport: `group`, `supergroup`, `channel`.
    pub kind: String,
    pub title: Option<String>,
}

/// One row of the `groups` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StoredGroup {
    pub id: i64,
    pub kind: String,
    pub title: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}
