//! The lifecycle error taxonomy.
//!
//! Callers (the HTTP layer in particular) branch on these variants
//! structurally; no layer inspects error message text to decide behavior.

use thiserror::Error;

use shard_core::IdentError;
use shardhost_backup::BackupError;
use shardhost_cluster::ClusterError;
use shardhost_remote::RemoteError;
use shardhost_store::StoreError;

/// Result type alias for lifecycle operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Errors surfaced by lifecycle operations.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Malformed identifiers or payload; rejected before any side effect.
    #[error("{0}")]
    Validation(String),

    #[error("server {0} not found")]
    NotFound(String),

    /// Duplicate resource or an operation already in flight.
    #[error("{0}")]
    Conflict(String),

    /// The cluster rejected our credentials.
    #[error("{0}")]
    Authorization(String),

    /// A bounded wait (or the whole-operation deadline) expired.
    #[error("{0}")]
    Timeout(String),

    /// Cluster or store failure; fatal to the operation.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

impl From<IdentError> for LifecycleError {
    fn from(e: IdentError) -> Self {
        LifecycleError::Validation(e.to_string())
    }
}

impl From<ClusterError> for LifecycleError {
    fn from(e: ClusterError) -> Self {
        match e {
            ClusterError::NotFound(what) => LifecycleError::NotFound(what),
            ClusterError::AlreadyExists(what) => {
                LifecycleError::Conflict(format!("{what} already exists"))
            }
            ClusterError::Unauthorized(_) => LifecycleError::Authorization(e.to_string()),
            ClusterError::Timeout { .. } => LifecycleError::Timeout(e.to_string()),
            other => LifecycleError::Infrastructure(other.to_string()),
        }
    }
}

impl From<StoreError> for LifecycleError {
    fn from(e: StoreError) -> Self {
        LifecycleError::Infrastructure(e.to_string())
    }
}

impl From<RemoteError> for LifecycleError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Cluster(inner) => inner.into(),
            other => LifecycleError::Infrastructure(other.to_string()),
        }
    }
}

impl From<BackupError> for LifecycleError {
    fn from(e: BackupError) -> Self {
        match e {
            BackupError::Remote(inner) => inner.into(),
            BackupError::Store(inner) => inner.into(),
        }
    }
}
