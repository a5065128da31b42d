//! Lifecycle operation outcomes and read-only projections.

use serde::Serialize;

use shard_core::DisplayStatus;
use shardhost_cluster::PodInfo;

/// How clients reach a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    /// External address; `None` while allocation is pending.
    pub ip: Option<String>,
    pub port: u16,
}

/// Result of a `start` operation.
#[derive(Debug, Clone, Serialize)]
pub struct StartOutcome {
    pub connection: ConnectionInfo,
    /// Whether prior state existed in the store (as opposed to the
    /// default bundle having been seeded just now).
    pub restored: bool,
    /// Artifact paths present in the store when the server came up.
    pub existing_files: Vec<String>,
}

/// Result of a `stop` operation.
#[derive(Debug, Clone, Serialize)]
pub struct StopOutcome {
    pub files_saved: Vec<String>,
}

/// Result of a `pause` operation.
#[derive(Debug, Clone, Serialize)]
pub struct PauseOutcome {
    pub files_saved: Vec<String>,
}

/// Result of a `resume` operation.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeOutcome {
    pub connection: ConnectionInfo,
    /// Keys restored into the container, in restoration order.
    pub files_restored: Vec<String>,
}

/// Replica counts backing a display status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplicaCounts {
    pub ready: u32,
    pub desired: u32,
}

/// Resource figures of a running server (from its workload spec).
#[derive(Debug, Clone, Serialize)]
pub struct ResourceFigures {
    pub image: String,
    pub cpu_millis: u32,
    pub memory_mib: u32,
}

/// One row of the server listing.
#[derive(Debug, Clone, Serialize)]
pub struct ServerSummary {
    pub server_id: String,
    pub namespace: String,
    pub status: DisplayStatus,
    pub replicas: ReplicaCounts,
    #[serde(rename = "connection_info")]
    pub connection: Option<ConnectionInfo>,
    /// Unix timestamp (seconds) when the workload was created.
    pub created_at: u64,
}

/// Detailed status for a single server.
#[derive(Debug, Clone, Serialize)]
pub struct ServerDetail {
    pub server_id: String,
    pub namespace: String,
    pub status: DisplayStatus,
    pub replicas: ReplicaCounts,
    #[serde(rename = "connection_info")]
    pub connection: Option<ConnectionInfo>,
    pub pods: Vec<PodInfo>,
    pub resources: ResourceFigures,
    pub created_at: u64,
}
