//! Unit tests for UserRepository and the pool manager.
//!
//! Covers upsert insert/refresh semantics, lookups, counts, the health
//! probe, and idempotent close.

use crate::models::UserRecord;
use crate::sqlite_pool::SqlitePoolManager;
use crate::user_repo::UserRepository;

fn sample_record(id: i64, username: &str) -> UserRecord {
    UserRecord {
        id,
        username: Some(username.to_string()),
        first_name: Some("Test".to_string()),
        last_name: None,
        language_code: Some("en".to_string()),
        is_premium: false,
    }
}

async fn memory_repo() -> (SqlitePoolManager, UserRepository) {
    let pool = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool");
    let repo = UserRepository::new(pool.clone())
        .await
        .expect("Failed to create repository");
    (pool, repo)
}

#[tokio::test]
async fn test_upsert_then_get() {
    let (_pool, repo) = memory_repo().await;

    let stored = repo
        .upsert(&sample_record(123, "alice"))
        .await
        .expect("Failed to upsert user");
    assert_eq!(stored.id, 123);
    assert_eq!(stored.username.as_deref(), Some("alice"));

    let fetched = repo.get(123).await.expect("Failed to get user");
    assert!(fetched.is_some());
    assert_eq!(fetched.unwrap().username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_get_missing_returns_none() {
    let (_pool, repo) = memory_repo().await;

    let fetched = repo.get(999).await.expect("Failed to query");
    assert!(fetched.is_none());
}

#[tokio::test]
async fn test_upsert_refreshes_profile_and_keeps_first_seen() {
    let (_pool, repo) = memory_repo().await;

    let first = repo
        .upsert(&sample_record(123, "alice"))
        .await
        .expect("Failed to upsert user");

    let mut renamed = sample_record(123, "alice_renamed");
    renamed.is_premium = true;
    let second = repo.upsert(&renamed).await.expect("Failed to upsert user");

    assert_eq!(second.username.as_deref(), Some("alice_renamed"));
    assert!(second.is_premium);
    assert_eq!(second.first_seen, first.first_seen);
    assert!(second.last_seen >= first.last_seen);

    let total = repo.count().await.expect("Failed to count");
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_count_over_multiple_users() {
    let (_pool, repo) = memory_repo().await;

    for id in 1..=5 {
        repo.upsert(&sample_record(id, &format!("user{}", id)))
            .await
            .expect("Failed to upsert user");
    }

    let total = repo.count().await.expect("Failed to count");
    assert_eq!(total, 5);
}

#[tokio::test]
async fn test_health_check_and_idempotent_close() {
    let (pool, _repo) = memory_repo().await;

    assert!(pool.health_check().await);

    pool.close().await;
    assert!(pool.is_closed());
    assert!(!pool.health_check().await);

    // Second close must be a clean no-op.
    pool.close().await;
    assert!(pool.is_closed());
}

#[tokio::test]
async fn test_pool_creates_missing_database_file() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("zultra.db");
    let url = format!("sqlite:{}", path.display());

    let pool = SqlitePoolManager::new(&url)
        .await
        .expect("Failed to create pool");
    assert!(pool.health_check().await);
    assert!(path.exists());
    pool.close().await;
}

#[tokio::test]
async fn test_pool_fails_for_unreachable_path() {
    // create_if_missing creates the file, not its parent directories.
    let result = SqlitePoolManager::new("sqlite:/nonexistent/zultra.db").await;
    assert!(result.is_err());
}
