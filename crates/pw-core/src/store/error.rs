//! Error types for store I/O

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locking or persisting the status store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to acquire the store lock after multiple retries
    #[error("Failed to acquire lock on {path} after {retries} retries")]
    LockTimeout { path: PathBuf, retries: u32 },

    /// File I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to serialize or parse the store document
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}
