//! The `ClusterApi` trait — everything Shardhost asks of the cluster.

use async_trait::async_trait;

use crate::error::ClusterResult;
use crate::types::{Endpoint, EndpointSpec, ExecOutput, ExecRequest, PodInfo, Workload, WorkloadSpec};

/// Operations against the container-orchestration cluster.
///
/// Implementations are constructed once per process and injected as
/// `Arc<dyn ClusterApi>`; they must be safe to share across tasks.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fetch a workload by name, or `None` if absent.
    async fn get_workload(&self, namespace: &str, name: &str) -> ClusterResult<Option<Workload>>;

    /// Create a workload. Fails with `AlreadyExists` on a name collision —
    /// callers that need idempotency must check first.
    async fn create_workload(&self, spec: &WorkloadSpec) -> ClusterResult<()>;

    /// Apply an updated spec to an existing workload.
    async fn update_workload(&self, spec: &WorkloadSpec) -> ClusterResult<()>;

    /// Delete a workload. Returns whether it existed.
    async fn delete_workload(&self, namespace: &str, name: &str) -> ClusterResult<bool>;

    /// List all workloads in a namespace.
    async fn list_workloads(&self, namespace: &str) -> ClusterResult<Vec<Workload>>;

    /// Fetch an endpoint by name, or `None` if absent.
    async fn get_endpoint(&self, namespace: &str, name: &str) -> ClusterResult<Option<Endpoint>>;

    /// Provision a new endpoint. Address allocation is asynchronous; poll
    /// `get_endpoint` until `external_address` is assigned.
    async fn create_endpoint(&self, spec: &EndpointSpec) -> ClusterResult<()>;

    /// Delete an endpoint. Returns whether it existed.
    async fn delete_endpoint(&self, namespace: &str, name: &str) -> ClusterResult<bool>;

    /// List pods matching a label selector (e.g. `app=game-1`).
    async fn list_pods(&self, namespace: &str, selector: &str) -> ClusterResult<Vec<PodInfo>>;

    /// Execute a command inside a named pod and capture its output.
    async fn exec(&self, namespace: &str, pod: &str, req: &ExecRequest)
    -> ClusterResult<ExecOutput>;
}
