//! Rate-limit stage: per-user sliding window over request timestamps.
//!
//! Each check prunes, counts, and (when admitted) appends under one DashMap
//! entry guard, so concurrent updates from the same user are serialized per
//! key without a global lock. Vetoed requests are not recorded; they don't
//! extend the user's window.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{instrument, warn};
use zultra_core::{Bot, Middleware, Result, Update, UpdateContext};

pub struct RateLimitMiddleware {
    max_messages: usize,
    window: Duration,
    windows: DashMap<i64, Vec<Instant>>,
    bot: Arc<dyn Bot>,
    enabled: AtomicBool,
}

impl RateLimitMiddleware {
    pub fn new(max_messages: usize, window: Duration, bot: Arc<dyn Bot>) -> Self {
        Self {
            max_messages,
            window,
            windows: DashMap::new(),
            bot,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Number of users currently holding a window.
    pub fn tracked_users(&self) -> usize {
        self.windows.len()
    }

    /// Evicts users whose newest request is older than `ttl`. Returns how
    /// many entries were dropped. Called from the periodic sweep task.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        let before = self.windows.len();
        let now = Instant::now();
        self.windows
            .retain(|_, stamps| stamps.last().is_some_and(|t| now.duration_since(*t) < ttl));
        before - self.windows.len()
    }
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[instrument(skip(self, update, _ctx))]
    async fn process_update(&self, update: &Update, _ctx: &mut UpdateContext) -> Result<bool> {
        let Some(user_id) = update.user_id() else {
            return Ok(true);
        };

        let now = Instant::now();
        // Prune, check, and record under the entry guard; drop it before any
        // await so a slow notice send can't block the shard.
        let blocked = {
            let mut entry = self.windows.entry(user_id).or_default();
            entry.retain(|t| now.duration_since(*t) < self.window);
            if entry.len() >= self.max_messages {
                true
            } else {
                entry.push(now);
                false
            }
        };

        if blocked {
            warn!(
                user_id,
                max_messages = self.max_messages,
                window_seconds = self.window.as_secs(),
                "Rate limit exceeded"
            );
            let notice = format!(
                "Slow down! You're sending messages too quickly. Please wait {} seconds.",
                self.window.as_secs()
            );
            // The veto stands even if the notice can't be delivered.
            if let Err(e) = self.bot.reply_to(update, &notice).await {
                warn!(user_id, error = %e, "Failed to send rate limit notice");
            }
            return Ok(false);
        }

        Ok(true)
    }
}
