//! Admin commands: /health and /reload. Both sit behind the admin gate.

use std::sync::Arc;

use async_trait::async_trait;
use zultra_core::{Bot, BotError, Result, Update, UpdateContext, UpdateHandler};

use crate::health::HealthService;
use crate::settings::SettingsStore;

/// `/health`: the full report as pretty-printed JSON.
pub struct HealthHandler {
    bot: Arc<dyn Bot>,
    health: Arc<HealthService>,
}

impl HealthHandler {
    pub fn new(bot: Arc<dyn Bot>, health: Arc<HealthService>) -> Self {
        Self { bot, health }
    }
}

#[async_trait]
impl UpdateHandler for HealthHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        let report = self.health.report().await;
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| BotError::Unexpected(format!("health serialization: {}", e)))?;
        self.bot.reply_to(update, &text).await
    }
}

/// `/reload`: re-read settings from the environment. A failed reload is
/// reported in the reply and the previous settings stay active.
pub struct ReloadHandler {
    bot: Arc<dyn Bot>,
    store: Arc<SettingsStore>,
}

impl ReloadHandler {
    pub fn new(bot: Arc<dyn Bot>, store: Arc<SettingsStore>) -> Self {
        Self { bot, store }
    }
}

#[async_trait]
impl UpdateHandler for ReloadHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        match self.store.reload() {
            Ok(fresh) => {
                let text = format!(
                    "Settings reloaded ({} environment).",
                    fresh.environment.as_str()
                );
                self.bot.reply_to(update, &text).await
            }
            Err(e) => {
                let text = format!("Reload failed: {}. Previous settings kept.", e);
                self.bot.reply_to(update, &text).await
            }
        }
    }
}
