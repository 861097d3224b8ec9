//! Unit tests for PermissionMiddleware: tier resolution and the
//! never-vetoes guarantee.

use std::collections::HashSet;

use zultra_core::{Middleware, PermissionTier, UpdateContext};

use super::support::{anonymous_update, text_update};
use crate::PermissionMiddleware;

fn gate() -> PermissionMiddleware {
    PermissionMiddleware::new(HashSet::from([1000]), HashSet::from([2000, 2001]))
}

#[tokio::test]
async fn test_owner_resolves_owner_tier() {
    let mw = gate();
    let mut ctx = UpdateContext::new();
    assert!(mw
        .process_update(&text_update(1000, "/health"), &mut ctx)
        .await
        .expect("Failed to process update"));
    assert_eq!(ctx.permission, Some(PermissionTier::Owner));
}

#[tokio::test]
async fn test_admin_resolves_admin_tier() {
    let mw = gate();
    let mut ctx = UpdateContext::new();
    assert!(mw
        .process_update(&text_update(2001, "/health"), &mut ctx)
        .await
        .expect("Failed to process update"));
    assert_eq!(ctx.permission, Some(PermissionTier::Admin));
}

#[tokio::test]
async fn test_unknown_user_resolves_user_tier() {
    let mw = gate();
    let mut ctx = UpdateContext::new();
    assert!(mw
        .process_update(&text_update(5, "hi"), &mut ctx)
        .await
        .expect("Failed to process update"));
    assert_eq!(ctx.permission, Some(PermissionTier::User));
}

/// **Test: a user listed in both sets resolves to the higher tier.**
#[tokio::test]
async fn test_owner_wins_over_admin() {
    let mw = PermissionMiddleware::new(HashSet::from([7]), HashSet::from([7]));
    let mut ctx = UpdateContext::new();
    mw.process_update(&text_update(7, "hi"), &mut ctx)
        .await
        .expect("Failed to process update");
    assert_eq!(ctx.permission, Some(PermissionTier::Owner));
}

/// **Test: updates without a user continue with no tier set.**
#[tokio::test]
async fn test_update_without_user_continues_unannotated() {
    let mw = gate();
    let mut ctx = UpdateContext::new();
    assert!(mw
        .process_update(&anonymous_update(), &mut ctx)
        .await
        .expect("Failed to process update"));
    assert_eq!(ctx.permission, None);
}
