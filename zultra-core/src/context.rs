//! Per-update scratch state shared between pipeline stages.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Privilege tier resolved by the permission stage. Ordered so that
/// `Owner > Admin > User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PermissionTier {
    User,
    Admin,
    Owner,
}

/// Mutable request-scoped state. Created at pipeline entry, owned by the
/// in-flight update, dropped at pipeline exit. Stages communicate derived
/// facts to the handler through it.
#[derive(Debug)]
pub struct UpdateContext {
    pub received_at: Instant,
    pub permission: Option<PermissionTier>,
}

impl UpdateContext {
    pub fn new() -> Self {
        Self {
            received_at: Instant::now(),
            permission: None,
        }
    }

    /// Wall time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.received_at.elapsed()
    }

    pub fn is_privileged(&self) -> bool {
        matches!(
            self.permission,
            Some(PermissionTier::Admin | PermissionTier::Owner)
        )
    }
}

impl Default for UpdateContext {
    fn default() -> Self {
        Self::new()
    }
}
