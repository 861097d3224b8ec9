//! Outbound transport trait. The teloxide implementation lives in
//! zultra-telegram; tests use in-memory doubles.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Update;

/// Minimal outbound surface middleware and handlers use to reach the user.
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends plain text to a chat.
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Sends `text` to the update's chat; no-op when the update carries no
    /// chat (e.g. inline queries).
    async fn reply_to(&self, update: &Update, text: &str) -> Result<()> {
        match update.chat_id() {
            Some(chat_id) => self.send_message(chat_id, text).await,
            None => Ok(()),
        }
    }
}
