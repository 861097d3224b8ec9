//! # Zultra bot application
//!
//! Wires settings, the middleware pipeline, command handlers, and the
//! serving runtime into a managed lifecycle. The binary in `main.rs` is a
//! thin CLI shell over [`ZultraBot`].

pub mod cache;
pub mod cli;
pub mod dispatcher;
pub mod faults;
pub mod handlers;
pub mod health;
pub mod lifecycle;
pub mod registry;
pub mod runtime;
pub mod settings;

#[cfg(test)]
mod testing;

pub use cli::{Cli, Commands};
pub use dispatcher::UpdateDispatcher;
pub use faults::FaultReporter;
pub use health::{format_uptime, HealthReport, HealthService};
pub use lifecycle::{LifecycleState, ZultraBot};
pub use registry::{AdminGate, CommandRegistry, RegisteredCommand};
pub use settings::{Environment, Settings, SettingsStore};
