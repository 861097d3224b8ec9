//! The everyday commands: /start, /help, /ping, /uptime, and the reply for
//! commands nobody registered.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;
use zultra_core::{Bot, Result, Update, UpdateContext, UpdateHandler};

use crate::health::format_uptime;

/// `/start`: greet the user by first name.
pub struct StartHandler {
    bot: Arc<dyn Bot>,
}

impl StartHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateHandler for StartHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        let name = update
            .user
            .as_ref()
            .and_then(|user| user.first_name.as_deref())
            .unwrap_or("there");
        let text = format!(
            "Hello, {}! I'm Zultra. Send /help to see what I can do.",
            name
        );
        self.bot.reply_to(update, &text).await
    }
}

/// `/help`: the public command listing, rendered once at construction.
pub struct HelpHandler {
    bot: Arc<dyn Bot>,
    text: String,
}

impl HelpHandler {
    pub fn new(bot: Arc<dyn Bot>, mut commands: Vec<(String, &'static str)>) -> Self {
        commands.push(("help".to_string(), "Show this message"));
        commands.sort();

        let mut text = String::from("Available commands:\n");
        for (name, description) in &commands {
            text.push_str(&format!("/{} - {}\n", name, description));
        }
        Self {
            bot,
            text: text.trim_end().to_string(),
        }
    }
}

#[async_trait]
impl UpdateHandler for HelpHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        self.bot.reply_to(update, &self.text).await
    }
}

/// `/ping`: round-trip check, reporting time spent since pipeline entry.
pub struct PingHandler {
    bot: Arc<dyn Bot>,
}

impl PingHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateHandler for PingHandler {
    async fn handle(&self, update: &Update, ctx: &UpdateContext) -> Result<()> {
        let text = format!("Pong! ({} ms)", ctx.elapsed().as_millis());
        self.bot.reply_to(update, &text).await
    }
}

/// `/uptime`: time since the bot entered its running state.
pub struct UptimeHandler {
    bot: Arc<dyn Bot>,
    started_at: Arc<RwLock<Option<Instant>>>,
}

impl UptimeHandler {
    pub fn new(bot: Arc<dyn Bot>, started_at: Arc<RwLock<Option<Instant>>>) -> Self {
        Self { bot, started_at }
    }
}

#[async_trait]
impl UpdateHandler for UptimeHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        let text = match *self.started_at.read().await {
            Some(started) => format!("Uptime: {}", format_uptime(started.elapsed())),
            None => "The bot is still starting up.".to_string(),
        };
        self.bot.reply_to(update, &text).await
    }
}

/// Reply for commands missing from the registry.
pub struct UnknownCommandHandler {
    bot: Arc<dyn Bot>,
}

impl UnknownCommandHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateHandler for UnknownCommandHandler {
    async fn handle(&self, update: &Update, _ctx: &UpdateContext) -> Result<()> {
        self.bot.reply_to(update, "Unknown command. Try /help.").await
    }
}
