//! Informational commands: /id and /stats.

use std::sync::Arc;

use async_trait::async_trait;
use storage::{GroupRepository, UserRepository};
use update_pipeline::UpdatePipeline;
use zultra_core::{Bot, BotError, Result, Update, UpdateContext, UpdateHandler};

/// `/id`: echo the caller's user id and the chat id.
pub struct IdHandler {
    bot: Arc<dyn Bot>,
}

impl IdHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateHandler for IdHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        let mut lines = Vec::new();
        if let Some(user_id) = update.user_id() {
            lines.push(format!("Your user id: {}", user_id));
        }
        if let Some(chat_id) = update.chat_id() {
            lines.push(format!("Chat id: {}", chat_id));
        }
        if lines.is_empty() {
            return Ok(());
        }
        self.bot.reply_to(update, &lines.join("\n")).await
    }
}

/// `/stats`: tracked-entity counts plus per-stage pipeline counters. Unlike
/// the tracking middleware, a storage failure here is surfaced to the caller.
pub struct StatsHandler {
    bot: Arc<dyn Bot>,
    users: UserRepository,
    groups: GroupRepository,
    pipeline: UpdatePipeline,
}

impl StatsHandler {
    pub fn new(
        bot: Arc<dyn Bot>,
        users: UserRepository,
        groups: GroupRepository,
        pipeline: UpdatePipeline,
    ) -> Self {
        Self {
            bot,
            users,
            groups,
            pipeline,
        }
    }
}

#[async_trait]
impl UpdateHandler for StatsHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        let users = self
            .users
            .count()
            .await
            .map_err(|e| BotError::Persistence(e.to_string()))?;
        let groups = self
            .groups
            .count()
            .await
            .map_err(|e| BotError::Persistence(e.to_string()))?;

        let mut text = format!("Users tracked: {}\nGroups tracked: {}", users, groups);
        for stats in self.pipeline.stats() {
            text.push_str(&format!(
                "\n{}: {} processed, {} errors",
                stats.name, stats.processed, stats.errors
            ));
        }
        self.bot.reply_to(update, &text).await
    }
}
