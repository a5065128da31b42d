//! Error types for the remote file channel.

use thiserror::Error;

use shardhost_cluster::ClusterError;

/// Result type alias for remote file operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors that can occur while operating on files in a container.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No ready pod exists for the server; nothing can proceed.
    #[error("no running instance found for server {0}")]
    NoRunningInstance(String),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    /// A single command failed; recoverable per path.
    #[error("command failed on {path} (exit {exit_code}): {stderr}")]
    CommandFailed {
        path: String,
        exit_code: i32,
        stderr: String,
    },

    #[error("transfer decode error: {0}")]
    Decode(String),
}
