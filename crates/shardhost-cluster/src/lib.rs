//! shardhost-cluster — the cluster seam and workload controller.
//!
//! Everything Shardhost asks of the container-orchestration cluster goes
//! through the [`ClusterApi`] trait: workload CRUD, endpoint provisioning,
//! pod listing, and command execution inside a running container. Two
//! implementations ship here:
//!
//! - [`HttpClusterClient`] — a typed REST client for the cluster agent,
//!   constructed once and injected everywhere (never rebuilt per call).
//! - [`InMemoryCluster`] — a full in-process cluster with a recorded exec
//!   log, the standard test double and local-dev backend.
//!
//! [`WorkloadController`] layers the lifecycle-facing operations on top:
//! create, scale, delete, endpoint reuse-or-provision, and readiness waits.

mod api;
mod controller;
mod error;
mod http;
mod memory;
mod types;

pub use api::ClusterApi;
pub use controller::{PollPolicy, WorkloadController};
pub use error::{ClusterError, ClusterResult};
pub use http::HttpClusterClient;
pub use memory::{ExecRecord, InMemoryCluster};
pub use types::{
    AllocationMethod, Endpoint, EndpointSpec, ExecOutput, ExecRequest, PodInfo, Workload,
    WorkloadSpec, WorkloadStatus,
};
