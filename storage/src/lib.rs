//! Storage crate: user and group persistence behind the bot's gateway.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserRecord, StoredUser, GroupRecord, StoredGroup
//! - [`user_repo`] – UserRepository (SQLite)
//! - [`group_repo`] – GroupRepository (SQLite)
//! - [`sqlite_pool`] – SqlitePoolManager

mod error;
mod group_repo;
mod models;
mod sqlite_pool;
mod user_repo;

#[cfg(test)]
mod user_repo_test;

pub use error::StorageError;
pub use group_repo::GroupRepository;
pub use models::{GroupRecord, StoredGroup, StoredUser, UserRecord};
pub use sqlite_pool::SqlitePoolManager;
pub use user_repo::UserRepository;
