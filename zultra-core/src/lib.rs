//! # zultra-core
//!
//! Core types and traits for the Zultra bot: [`Update`] and its payload variants,
//! [`UpdateContext`], the [`Middleware`], [`UpdateHandler`] and [`Bot`] traits,
//! the [`BotError`] taxonomy, and tracing initialization. Transport-agnostic;
//! used by zultra-telegram, update-pipeline, and the middleware stages.

pub mod bot;
pub mod context;
pub mod error;
pub mod handler;
pub mod logger;
pub mod middleware;
pub mod types;

pub use bot::Bot;
pub use context::{PermissionTier, UpdateContext};
pub use error::{BotError, Result};
pub use handler::UpdateHandler;
pub use logger::init_tracing;
pub use middleware::Middleware;
pub use types::{ChatKind, ChatRef, ToCoreUpdate, Update, UpdatePayload, UserRef};
