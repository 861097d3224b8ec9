//! Unit tests for UserTrackingMiddleware: best-effort upserts.
//!
//! Uses in-memory SQLite (sqlite::memory:); no external DB.

use storage::{GroupRepository, SqlitePoolManager, UserRepository};
use zultra_core::{Middleware, UpdateContext};

use super::support::{anonymous_update, group_text_update, text_update};
use crate::UserTrackingMiddleware;

async fn tracking() -> (UserTrackingMiddleware, UserRepository, GroupRepository) {
    let pool = SqlitePoolManager::new("sqlite::memory:")
        .await
        .expect("Failed to create pool");
    let users = UserRepository::new(pool.clone())
        .await
        .expect("Failed to create user repository");
    let groups = GroupRepository::new(pool)
        .await
        .expect("Failed to create group repository");
    (
        UserTrackingMiddleware::new(users.clone(), groups.clone()),
        users,
        groups,
    )
}

/// **Test: a private-chat update upserts the user, skips the group table,
/// and continues.**
#[tokio::test]
async fn test_tracks_user_and_continues() {
    let (mw, users, groups) = tracking().await;
    let mut ctx = UpdateContext::new();

    let passed = mw
        .process_update(&text_update(123, "hi"), &mut ctx)
        .await
        .expect("Failed to process update");
    assert!(passed);

    let stored = users
        .get(123)
        .await
        .expect("Failed to load user")
        .expect("User was not tracked");
    assert_eq!(stored.username.as_deref(), Some("testuser"));
    assert_eq!(groups.count().await.expect("Failed to count groups"), 0);
}

/// **Test: a supergroup update upserts both the user and the group.**
#[tokio::test]
async fn test_tracks_group_chats() {
    let (mw, users, groups) = tracking().await;
    let mut ctx = UpdateContext::new();

    mw.process_update(&group_text_update(123, -100500, "hi"), &mut ctx)
        .await
        .expect("Failed to process update");

    assert!(users.get(123).await.expect("Failed to load user").is_some());
    let group = groups
        .get(-100500)
        .await
        .expect("Failed to load group")
        .expect("Group was not tracked");
    assert_eq!(group.kind, "supergroup");
    assert_eq!(group.title.as_deref(), Some("Test Group"));
}

/// **Test: updates without a user or chat continue without writing rows.**
#[tokio::test]
async fn test_update_without_user_still_continues() {
    let (mw, users, groups) = tracking().await;
    let mut ctx = UpdateContext::new();

    let passed = mw
        .process_update(&anonymous_update(), &mut ctx)
        .await
        .expect("Failed to process update");
    assert!(passed);
    assert_eq!(users.count().await.expect("Failed to count users"), 0);
    assert_eq!(groups.count().await.expect("Failed to count groups"), 0);
}
