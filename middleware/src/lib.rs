//! # Middleware stages
//!
//! The five pipeline stages the bot registers, in order: logging,
//! user-tracking, rate-limit, anti-spam, permission. Each implements
//! [`zultra_core::Middleware`]; the rate-limit and anti-spam stages veto,
//! logging and user-tracking only observe, and permission annotates the
//! context for downstream handlers.

pub mod anti_spam;
pub mod logging;
pub mod permission;
pub mod rate_limit;
pub mod user_tracking;

#[cfg(test)]
mod test;

pub use anti_spam::{AntiSpamMiddleware, REPEAT_LIMIT, REPEAT_WINDOW};
pub use logging::{LoggingMiddleware, SlowRequest, SLOW_REQUEST_CAPACITY};
pub use permission::PermissionMiddleware;
pub use rate_limit::RateLimitMiddleware;
pub use user_tracking::UserTrackingMiddleware;
