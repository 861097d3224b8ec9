//! Storage error types.
//!
//! The repositories surface this instead of raw `sqlx::Error`; callers map
//! it at their own boundary.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
