//! Permission stage: resolves the caller's tier from the configured owner
//! and admin id sets and stores it in the context. Never vetoes; admin-only
//! command enforcement happens in the dispatcher's gate, not here.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, instrument};
use zultra_core::{Middleware, PermissionTier, Result, Update, UpdateContext};

pub struct PermissionMiddleware {
    owner_ids: HashSet<i64>,
    admin_ids: HashSet<i64>,
    enabled: AtomicBool,
}

impl PermissionMiddleware {
    pub fn new(owner_ids: HashSet<i64>, admin_ids: HashSet<i64>) -> Self {
        Self {
            owner_ids,
            admin_ids,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    fn tier_for(&self, user_id: i64) -> PermissionTier {
        if self.owner_ids.contains(&user_id) {
            PermissionTier::Owner
        } else if self.admin_ids.contains(&user_id) {
            PermissionTier::Admin
        } else {
            PermissionTier::User
        }
    }
}

#[async_trait]
impl Middleware for PermissionMiddleware {
    fn name(&self) -> &'static str {
        "permission"
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[instrument(skip(self, update, ctx))]
    async fn process_update(&self, update: &Update, ctx: &mut UpdateContext) -> Result<bool> {
        if let Some(user_id) = update.user_id() {
            let tier = self.tier_for(user_id);
            debug!(user_id, tier = ?tier, "Resolved permission tier");
            ctx.permission = Some(tier);
        }
        Ok(true)
    }
}
