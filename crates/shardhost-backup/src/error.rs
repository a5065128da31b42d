//! Error types for the backup/restore engine.

use thiserror::Error;

use shardhost_remote::RemoteError;
use shardhost_store::StoreError;

/// Result type alias for backup/restore operations.
pub type BackupResult<T> = Result<T, BackupError>;

/// Fatal errors for a whole backup or restore call. Per-file failures are
/// not errors at this level; they are dropped from the result list.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
