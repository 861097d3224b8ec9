//! Command handlers: the units of work the dispatcher routes updates to.

mod admin;
mod ai;
mod basic;
mod noop;
mod utility;

pub use admin::{HealthHandler, ReloadHandler};
pub use ai::{AskHandler, ChatFallbackHandler, SharedAi, AI_TIMEOUT};
pub use basic::{HelpHandler, PingHandler, StartHandler, UnknownCommandHandler, UptimeHandler};
pub use noop::NoOpHandler;
pub use utility::{IdHandler, StatsHandler};
