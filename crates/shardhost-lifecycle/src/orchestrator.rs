//! Orchestrator — sequences cluster and backup operations per transition.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use shard_core::layout::{self, TRACKED_CONFIG_FILES};
use shard_core::{DisplayStatus, GamePackage, Namespace, ProfileTable, ServerId};
use shardhost_backup::BackupEngine;
use shardhost_cluster::{ClusterApi, Endpoint, PollPolicy, Workload, WorkloadController};
use shardhost_remote::RemoteFileChannel;
use shardhost_store::{ArtifactContent, ArtifactStore};

use crate::error::{LifecycleError, LifecycleResult};
use crate::lease::ServerLeases;
use crate::types::{
    ConnectionInfo, PauseOutcome, ReplicaCounts, ResourceFigures, ResumeOutcome, ServerDetail,
    ServerSummary, StartOutcome, StopOutcome,
};

/// Default bound for one whole lifecycle operation, polling included.
const OP_DEADLINE: Duration = Duration::from_secs(120);

/// Top-level lifecycle state machine for game servers.
///
/// Owns the injected cluster handle, the artifact store, the profile
/// table, and the per-server lease set. One instance serves the whole
/// process; operations may run concurrently for distinct servers.
pub struct Orchestrator {
    api: Arc<dyn ClusterApi>,
    controller: WorkloadController,
    store: ArtifactStore,
    profiles: ProfileTable,
    leases: ServerLeases,
    op_deadline: Duration,
}

impl Orchestrator {
    pub fn new(api: Arc<dyn ClusterApi>, store: ArtifactStore, profiles: ProfileTable) -> Self {
        Self {
            controller: WorkloadController::new(api.clone()),
            api,
            store,
            profiles,
            leases: ServerLeases::new(),
            op_deadline: OP_DEADLINE,
        }
    }

    /// Override polling bounds and the operation deadline (tests use tiny
    /// intervals).
    pub fn with_timing(
        mut self,
        endpoint_poll: PollPolicy,
        pod_poll: PollPolicy,
        op_deadline: Duration,
    ) -> Self {
        self.controller =
            WorkloadController::new(self.api.clone()).with_poll_policies(endpoint_poll, pod_poll);
        self.op_deadline = op_deadline;
        self
    }

    fn lease_key(namespace: &Namespace, id: &ServerId) -> String {
        format!("{namespace}/{id}")
    }

    fn engine_for(&self, namespace: &Namespace, id: &ServerId) -> BackupEngine {
        let channel = RemoteFileChannel::new(self.api.clone(), namespace.clone(), id.clone());
        BackupEngine::new(channel, self.store.clone())
    }

    /// Run `fut` under the whole-operation deadline.
    async fn bounded<T>(
        &self,
        what: &str,
        fut: impl Future<Output = LifecycleResult<T>>,
    ) -> LifecycleResult<T> {
        tokio::time::timeout(self.op_deadline, fut)
            .await
            .map_err(|_| LifecycleError::Timeout(format!("{what} exceeded the operation deadline")))?
    }

    // ── Transitions ────────────────────────────────────────────────

    /// Bring a server up. Seeds the default config bundle when the store
    /// holds nothing for this id.
    pub async fn start(
        &self,
        id: &ServerId,
        package: GamePackage,
        namespace: &Namespace,
    ) -> LifecycleResult<StartOutcome> {
        let _lease = self.acquire(namespace, id)?;
        self.bounded("start", async {
            if self.controller.get(namespace, id).await?.is_some() {
                return Err(LifecycleError::Conflict(format!(
                    "workload for {id} already exists"
                )));
            }

            let mut existing = self.store.list(id)?;
            let restored = !existing.is_empty();
            if !restored {
                for (name, content) in layout::default_artifacts() {
                    self.store
                        .put(id, name, &ArtifactContent::Text(content))?;
                }
                existing = self.store.list(id)?;
                info!(server_id = %id, files = existing.len(), "seeded default config bundle");
            }

            let profile = self.profiles.get(package).clone();
            self.controller.create(id, namespace, &profile).await?;
            let endpoint = self
                .controller
                .ensure_endpoint(namespace, id, profile.port)
                .await?;

            info!(server_id = %id, %namespace, restored, "server started");
            Ok(StartOutcome {
                connection: connection_info(&endpoint, profile.port),
                restored,
                existing_files: existing,
            })
        })
        .await
    }

    /// Tear a server down, saving tracked config files first (best-effort;
    /// the world directory is only snapshotted on pause).
    pub async fn stop(&self, id: &ServerId, namespace: &Namespace) -> LifecycleResult<StopOutcome> {
        let _lease = self.acquire(namespace, id)?;
        self.bounded("stop", async {
            if self.controller.get(namespace, id).await?.is_none() {
                return Err(LifecycleError::NotFound(id.to_string()));
            }

            let files_saved = match self
                .engine_for(namespace, id)
                .backup_config(&TRACKED_CONFIG_FILES)
                .await
            {
                Ok(saved) => saved,
                Err(e) => {
                    warn!(server_id = %id, error = %e, "config backup failed during stop, proceeding with teardown");
                    Vec::new()
                }
            };

            self.controller.delete(namespace, id).await?;
            info!(server_id = %id, %namespace, files = files_saved.len(), "server stopped");
            Ok(StopOutcome { files_saved })
        })
        .await
    }

    /// Snapshot everything, then park the workload at zero replicas. The
    /// endpoint is preserved for resume.
    pub async fn pause(
        &self,
        id: &ServerId,
        namespace: &Namespace,
    ) -> LifecycleResult<PauseOutcome> {
        let _lease = self.acquire(namespace, id)?;
        self.bounded("pause", async {
            if self.controller.get(namespace, id).await?.is_none() {
                return Err(LifecycleError::NotFound(id.to_string()));
            }

            let files_saved = self
                .engine_for(namespace, id)
                .backup_full(&TRACKED_CONFIG_FILES)
                .await?;

            self.controller.scale(namespace, id, 0).await?;
            info!(server_id = %id, %namespace, files = files_saved.len(), "server paused");
            Ok(PauseOutcome { files_saved })
        })
        .await
    }

    /// Scale the workload back up, wait for readiness, and rehydrate state
    /// from the store (world archive before individual files).
    pub async fn resume(
        &self,
        id: &ServerId,
        namespace: &Namespace,
    ) -> LifecycleResult<ResumeOutcome> {
        let _lease = self.acquire(namespace, id)?;
        self.bounded("resume", async {
            let Some(workload) = self.controller.get(namespace, id).await? else {
                return Err(LifecycleError::NotFound(id.to_string()));
            };

            self.controller.scale(namespace, id, 1).await?;
            self.controller.wait_for_pod_ready(namespace, id).await?;

            let files_restored = self.engine_for(namespace, id).restore().await?;

            let endpoint = self
                .api
                .get_endpoint(namespace.as_str(), &id.endpoint_name())
                .await?;
            let connection = ConnectionInfo {
                ip: endpoint.and_then(|e| e.external_address),
                port: workload.spec.port,
            };

            info!(server_id = %id, %namespace, files = files_restored.len(), "server resumed");
            Ok(ResumeOutcome {
                connection,
                files_restored,
            })
        })
        .await
    }

    // ── Projections ────────────────────────────────────────────────

    /// Detailed status of one server.
    pub async fn status(
        &self,
        id: &ServerId,
        namespace: &Namespace,
    ) -> LifecycleResult<ServerDetail> {
        let Some(workload) = self.controller.get(namespace, id).await? else {
            return Err(LifecycleError::NotFound(id.to_string()));
        };
        let pods = self.controller.pods(namespace, id).await?;
        let endpoint = self
            .api
            .get_endpoint(namespace.as_str(), &id.endpoint_name())
            .await?;

        Ok(ServerDetail {
            server_id: workload.spec.name.clone(),
            namespace: namespace.to_string(),
            status: derive_status(&workload),
            replicas: replica_counts(&workload),
            connection: endpoint.map(|e| connection_info(&e, workload.spec.port)),
            pods,
            resources: ResourceFigures {
                image: workload.spec.image.clone(),
                cpu_millis: workload.spec.cpu_millis,
                memory_mib: workload.spec.memory_mib,
            },
            created_at: workload.status.created_at,
        })
    }

    /// Summaries of every server workload in a namespace.
    pub async fn list(&self, namespace: &Namespace) -> LifecycleResult<Vec<ServerSummary>> {
        let workloads = self.controller.list(namespace).await?;
        let mut servers = Vec::with_capacity(workloads.len());
        for workload in workloads {
            let endpoint_name = format!("{}-svc", workload.spec.name);
            let endpoint = self
                .api
                .get_endpoint(namespace.as_str(), &endpoint_name)
                .await?;
            servers.push(ServerSummary {
                server_id: workload.spec.name.clone(),
                namespace: namespace.to_string(),
                status: derive_status(&workload),
                replicas: replica_counts(&workload),
                connection: endpoint.map(|e| connection_info(&e, workload.spec.port)),
                created_at: workload.status.created_at,
            });
        }
        Ok(servers)
    }

    fn acquire(&self, namespace: &Namespace, id: &ServerId) -> LifecycleResult<crate::lease::LeaseGuard> {
        let key = Self::lease_key(namespace, id);
        self.leases.acquire(&key).ok_or_else(|| {
            LifecycleError::Conflict(format!("another operation is in progress for {key}"))
        })
    }
}

fn derive_status(workload: &Workload) -> DisplayStatus {
    DisplayStatus::derive(workload.status.ready_replicas, workload.spec.replicas)
}

fn replica_counts(workload: &Workload) -> ReplicaCounts {
    ReplicaCounts {
        ready: workload.status.ready_replicas,
        desired: workload.spec.replicas,
    }
}

fn connection_info(endpoint: &Endpoint, port: u16) -> ConnectionInfo {
    ConnectionInfo {
        ip: endpoint.external_address.clone(),
        port,
    }
}
