//! Anti-spam stage: keyword denylist plus repeated-message detection over a
//! per-user rolling history. Only text payloads are inspected; everything
//! else passes through.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::{instrument, warn};
use zultra_core::{Bot, Middleware, Result, Update, UpdateContext};

/// Repetition is judged over the last 60 seconds of messages.
pub const REPEAT_WINDOW: Duration = Duration::from_secs(60);

/// The nth identical message inside the window is vetoed.
pub const REPEAT_LIMIT: usize = 3;

pub struct AntiSpamMiddleware {
    keywords: Vec<String>,
    history: DashMap<i64, VecDeque<(Instant, String)>>,
    bot: Arc<dyn Bot>,
    enabled: AtomicBool,
}

impl AntiSpamMiddleware {
    /// Keywords are matched case-insensitively as substrings; they are
    /// lowercased once here.
    pub fn new(keywords: Vec<String>, bot: Arc<dyn Bot>) -> Self {
        Self {
            keywords: keywords.into_iter().map(|k| k.to_lowercase()).collect(),
            history: DashMap::new(),
            bot,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn tracked_users(&self) -> usize {
        self.history.len()
    }

    /// Evicts users whose newest message is older than `ttl`.
    pub fn sweep_idle(&self, ttl: Duration) -> usize {
        let before = self.history.len();
        let now = Instant::now();
        self.history
            .retain(|_, entries| {
                entries
                    .back()
                    .is_some_and(|(t, _)| now.duration_since(*t) < ttl)
            });
        before - self.history.len()
    }

    async fn notify(&self, update: &Update, text: &str) {
        if let Err(e) = self.bot.reply_to(update, text).await {
            warn!(error = %e, "Failed to send anti-spam notice");
        }
    }
}

#[async_trait]
impl Middleware for AntiSpamMiddleware {
    fn name(&self) -> &'static str {
        "anti_spam"
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[instrument(skip(self, update, _ctx))]
    async fn process_update(&self, update: &Update, _ctx: &mut UpdateContext) -> Result<bool> {
        let (Some(user_id), Some(text)) = (update.user_id(), update.text()) else {
            return Ok(true);
        };

        let normalized = text.to_lowercase();

        if let Some(keyword) = self
            .keywords
            .iter()
            .find(|k| normalized.contains(k.as_str()))
        {
            warn!(user_id, keyword = %keyword, "Message matched spam keyword");
            self.notify(update, "Your message contains suspicious content.")
                .await;
            return Ok(false);
        }

        // Unlike the rate limiter, vetoed messages stay recorded: repeating
        // a message past the limit keeps counting as repetition.
        let now = Instant::now();
        let repeats = {
            let mut entry = self.history.entry(user_id).or_default();
            entry.push_back((now, normalized.clone()));
            while let Some((t, _)) = entry.front() {
                if now.duration_since(*t) >= REPEAT_WINDOW {
                    entry.pop_front();
                } else {
                    break;
                }
            }
            entry.iter().filter(|(_, m)| *m == normalized).count()
        };

        if repeats >= REPEAT_LIMIT {
            warn!(user_id, repeats, "Repeated message detected");
            self.notify(update, "Please don't repeat the same message.")
                .await;
            return Ok(false);
        }

        Ok(true)
    }
}
