//! # zultra-telegram
//!
//! Telegram transport layer: adapters from teloxide types to core types and
//! the outbound [`zultra_core::Bot`] implementation. Handles only Telegram
//! connectivity; no persistence, pipeline, or AI logic.

mod adapters;
mod bot_adapter;

pub use adapters::TelegramUpdateWrapper;
pub use bot_adapter::TelegramBotAdapter;
