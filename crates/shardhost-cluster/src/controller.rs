//! WorkloadController — lifecycle-facing cluster operations.
//!
//! Owns an injected `Arc<dyn ClusterApi>` and layers the operations the
//! orchestrator sequences: workload create/scale/delete, endpoint
//! reuse-or-provision with bounded address polling, and pod readiness
//! waits. All waits are blocking polling loops with a fixed attempt count
//! and interval; callers bound the whole operation with their own deadline.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use shard_core::{Namespace, ProfileSpec, ServerId};

use crate::api::ClusterApi;
use crate::error::{ClusterError, ClusterResult};
use crate::types::{AllocationMethod, Endpoint, EndpointSpec, PodInfo, Workload, WorkloadSpec};

/// A bounded polling loop: `attempts` probes, `interval` apart.
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub const fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }
}

/// Default endpoint-address polling: 30 × 2s.
const ENDPOINT_POLL: PollPolicy = PollPolicy::new(30, Duration::from_secs(2));

/// Default pod-readiness polling: 12 × 5s.
const POD_READY_POLL: PollPolicy = PollPolicy::new(12, Duration::from_secs(5));

/// Creates, scales, and deletes server workloads and their endpoints.
pub struct WorkloadController {
    api: Arc<dyn ClusterApi>,
    endpoint_poll: PollPolicy,
    pod_poll: PollPolicy,
}

impl WorkloadController {
    pub fn new(api: Arc<dyn ClusterApi>) -> Self {
        Self {
            api,
            endpoint_poll: ENDPOINT_POLL,
            pod_poll: POD_READY_POLL,
        }
    }

    /// Override the polling bounds (tests use tiny intervals).
    pub fn with_poll_policies(mut self, endpoint: PollPolicy, pod: PollPolicy) -> Self {
        self.endpoint_poll = endpoint;
        self.pod_poll = pod;
        self
    }

    /// Render the workload spec for a server running the given profile.
    pub fn build_spec(id: &ServerId, namespace: &Namespace, profile: &ProfileSpec) -> WorkloadSpec {
        WorkloadSpec {
            name: id.to_string(),
            namespace: namespace.to_string(),
            image: profile.image.clone(),
            cpu_millis: profile.cpu_millis,
            memory_mib: profile.memory_mib,
            port: profile.port,
            env: profile.env.clone(),
            replicas: 1,
            labels: [("app".to_string(), id.to_string())].into(),
        }
    }

    /// Fetch a workload, or `None` if absent.
    pub async fn get(&self, namespace: &Namespace, id: &ServerId) -> ClusterResult<Option<Workload>> {
        self.api.get_workload(namespace.as_str(), id.as_str()).await
    }

    /// List all workloads in a namespace.
    pub async fn list(&self, namespace: &Namespace) -> ClusterResult<Vec<Workload>> {
        self.api.list_workloads(namespace.as_str()).await
    }

    /// List pods for a server.
    pub async fn pods(&self, namespace: &Namespace, id: &ServerId) -> ClusterResult<Vec<PodInfo>> {
        self.api.list_pods(namespace.as_str(), &id.selector()).await
    }

    /// Issue the workload to the cluster. Not idempotent — callers must
    /// check for an existing workload first.
    pub async fn create(
        &self,
        id: &ServerId,
        namespace: &Namespace,
        profile: &ProfileSpec,
    ) -> ClusterResult<()> {
        let spec = Self::build_spec(id, namespace, profile);
        self.api.create_workload(&spec).await?;
        info!(server_id = %id, %namespace, image = %spec.image, "workload created");
        Ok(())
    }

    /// Read the current spec, set the replica count, apply the update.
    pub async fn scale(
        &self,
        namespace: &Namespace,
        id: &ServerId,
        replicas: u32,
    ) -> ClusterResult<()> {
        let workload = self
            .get(namespace, id)
            .await?
            .ok_or_else(|| ClusterError::NotFound(id.to_string()))?;
        let mut spec = workload.spec;
        spec.replicas = replicas;
        self.api.update_workload(&spec).await?;
        info!(server_id = %id, %namespace, replicas, "workload scaled");
        Ok(())
    }

    /// Remove the workload and its endpoint. Returns whether the workload
    /// existed. If the workload is gone but the endpoint deletion fails,
    /// the error is surfaced as-is; there is no rollback.
    pub async fn delete(&self, namespace: &Namespace, id: &ServerId) -> ClusterResult<bool> {
        let existed = self
            .api
            .delete_workload(namespace.as_str(), id.as_str())
            .await?;
        self.api
            .delete_endpoint(namespace.as_str(), &id.endpoint_name())
            .await?;
        info!(server_id = %id, %namespace, existed, "workload and endpoint deleted");
        Ok(existed)
    }

    /// Reuse the server's endpoint if it already has an address; otherwise
    /// provision one and poll until the cluster assigns an address.
    pub async fn ensure_endpoint(
        &self,
        namespace: &Namespace,
        id: &ServerId,
        port: u16,
    ) -> ClusterResult<Endpoint> {
        let name = id.endpoint_name();

        match self.api.get_endpoint(namespace.as_str(), &name).await? {
            Some(endpoint) if endpoint.external_address.is_some() => {
                info!(server_id = %id, address = ?endpoint.external_address, "reusing existing endpoint");
                return Ok(endpoint);
            }
            Some(_) => {
                // Exists but no address yet; fall through to polling.
            }
            None => {
                let spec = EndpointSpec {
                    name: name.clone(),
                    namespace: namespace.to_string(),
                    port,
                    selector: id.selector(),
                    allocation: AllocationMethod::Dedicated,
                };
                self.api.create_endpoint(&spec).await?;
                info!(server_id = %id, %namespace, port, "endpoint provisioned");
            }
        }

        for attempt in 1..=self.endpoint_poll.attempts {
            if let Some(endpoint) = self.api.get_endpoint(namespace.as_str(), &name).await? {
                if endpoint.external_address.is_some() {
                    info!(
                        server_id = %id,
                        address = ?endpoint.external_address,
                        attempt,
                        "endpoint address assigned"
                    );
                    return Ok(endpoint);
                }
            }
            if attempt < self.endpoint_poll.attempts {
                tokio::time::sleep(self.endpoint_poll.interval).await;
            }
        }

        warn!(server_id = %id, attempts = self.endpoint_poll.attempts, "endpoint address never assigned");
        Err(ClusterError::Timeout {
            what: format!("endpoint address for {id}"),
            attempts: self.endpoint_poll.attempts,
        })
    }

    /// Poll until the server has a ready pod, returning it.
    pub async fn wait_for_pod_ready(
        &self,
        namespace: &Namespace,
        id: &ServerId,
    ) -> ClusterResult<PodInfo> {
        for attempt in 1..=self.pod_poll.attempts {
            let pods = self.pods(namespace, id).await?;
            if let Some(pod) = pods.into_iter().find(|p| p.ready) {
                info!(server_id = %id, pod = %pod.name, attempt, "pod ready");
                return Ok(pod);
            }
            if attempt < self.pod_poll.attempts {
                tokio::time::sleep(self.pod_poll.interval).await;
            }
        }

        warn!(server_id = %id, attempts = self.pod_poll.attempts, "pod never became ready");
        Err(ClusterError::Timeout {
            what: format!("ready pod for {id}"),
            attempts: self.pod_poll.attempts,
        })
    }
}
