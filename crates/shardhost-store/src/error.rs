//! Error types for the artifact store.

use thiserror::Error;

/// Result type alias for artifact store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during artifact store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("invalid artifact path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    #[error("artifact not found: {0}")]
    NotFound(String),

    #[error("artifact at {0} is not valid UTF-8")]
    NotText(String),
}
