//! User-tracking stage: best-effort upserts of the originating user and
//! group. Persistence failures are logged and never block the pipeline.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use storage::{GroupRecord, GroupRepository, UserRecord, UserRepository};
use tracing::{instrument, warn};
use zultra_core::{ChatKind, Middleware, Result, Update, UpdateContext};

pub struct UserTrackingMiddleware {
    users: UserRepository,
    groups: GroupRepository,
    enabled: AtomicBool,
}

impl UserTrackingMiddleware {
    pub fn new(users: UserRepository, groups: GroupRepository) -> Self {
        Self {
            users,
            groups,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

#[async_trait]
impl Middleware for UserTrackingMiddleware {
    fn name(&self) -> &'static str {
        "user_tracking"
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[instrument(skip(self, update, _ctx))]
    async fn process_update(&self, update: &Update, _ctx: &mut UpdateContext) -> Result<bool> {
        if let Some(user) = &update.user {
            let record = UserRecord {
                id: user.id,
                username: user.username.clone(),
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                language_code: user.language_code.clone(),
                is_premium: user.is_premium,
            };
            if let Err(e) = self.users.upsert(&record).await {
                warn!(user_id = user.id, error = %e, "Failed to track user");
            }
        }

        if let Some(chat) = &update.chat {
            if chat.kind != ChatKind::Private {
                let record = GroupRecord {
                    id: chat.id,
                    kind: chat.kind.as_str().to_string(),
                    title: chat.title.clone(),
                };
                if let Err(e) = self.groups.upsert(&record).await {
                    warn!(chat_id = chat.id, error = %e, "Failed to track group");
                }
            }
        }

        Ok(true)
    }
}
