//! AI-backed replies: the /ask command and the plain-text chat fallback.

use std::sync::Arc;
use std::time::Duration;

use ai_orchestrator::AiOrchestrator;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use zultra_core::{Bot, BotError, ChatKind, Result, Update, UpdateContext, UpdateHandler};

/// Late-bound orchestrator slot. Handlers are registered before the
/// best-effort AI setup runs, so they read the slot per request.
pub type SharedAi = Arc<RwLock<Option<Arc<AiOrchestrator>>>>;

/// Provider latency is unbounded; cap every request here.
pub const AI_TIMEOUT: Duration = Duration::from_secs(30);

/// Telegram rejects messages over 4096 chars; stay under with room to spare.
const MAX_REPLY_CHARS: usize = 4000;

async fn ask_with_timeout(ai: &AiOrchestrator, prompt: &str) -> Result<String> {
    match tokio::time::timeout(AI_TIMEOUT, ai.ask(prompt)).await {
        Ok(result) => result,
        Err(_) => Err(BotError::ExternalService(format!(
            "AI request exceeded {}s",
            AI_TIMEOUT.as_secs()
        ))),
    }
}

fn truncate_reply(text: &str) -> String {
    if text.chars().count() <= MAX_REPLY_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_REPLY_CHARS).collect();
    out.push('…');
    out
}

/// `/ask <question>`: one-shot question to the orchestrator.
pub struct AskHandler {
    bot: Arc<dyn Bot>,
    ai: SharedAi,
}

impl AskHandler {
    pub fn new(bot: Arc<dyn Bot>, ai: SharedAi) -> Self {
        Self { bot, ai }
    }
}

#[async_trait]
impl UpdateHandler for AskHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        let Some(prompt) = update.command_args() else {
            return self.bot.reply_to(update, "Usage: /ask <question>").await;
        };
        let Some(ai) = self.ai.read().await.clone() else {
            return self
                .bot
                .reply_to(update, "AI replies are not configured.")
                .await;
        };
        let answer = ask_with_timeout(&ai, prompt).await?;
        self.bot.reply_to(update, &truncate_reply(&answer)).await
    }
}

/// Plain text in a private chat goes to the orchestrator; group chatter and
/// unconfigured deployments are left alone.
pub struct ChatFallbackHandler {
    bot: Arc<dyn Bot>,
    ai: SharedAi,
}

impl ChatFallbackHandler {
    pub fn new(bot: Arc<dyn Bot>, ai: SharedAi) -> Self {
        Self { bot, ai }
    }
}

#[async_trait]
impl UpdateHandler for ChatFallbackHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        let Some(text) = update.text() else {
            return Ok(());
        };
        let is_private = update
            .chat
            .as_ref()
            .is_some_and(|chat| chat.kind == ChatKind::Private);
        if !is_private {
            return Ok(());
        }
        let Some(ai) = self.ai.read().await.clone() else {
            debug!(update_id = update.update_id, "No AI provider; ignoring text");
            return Ok(());
        };
        let answer = ask_with_timeout(&ai, text).await?;
        self.bot.reply_to(update, &truncate_reply(&answer)).await
    }
}
