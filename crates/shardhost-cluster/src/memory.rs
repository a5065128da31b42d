//! In-process cluster backend.
//!
//! Implements [`ClusterApi`] against plain in-memory maps: workloads are
//! immediately "scheduled", pods are synthesized from replica counts, and
//! endpoint addresses are auto-assigned unless withheld. Every exec call
//! is recorded in order, which is what the backup/restore ordering tests
//! key off. A scriptable exec handler supplies command output.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::api::ClusterApi;
use crate::error::{ClusterError, ClusterResult};
use crate::types::{
    Endpoint, EndpointSpec, ExecOutput, ExecRequest, PodInfo, Workload, WorkloadSpec,
    WorkloadStatus,
};

type ExecHandler = Box<dyn Fn(&str, &ExecRequest) -> ExecOutput + Send + Sync>;

/// One recorded exec invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecRecord {
    pub pod: String,
    pub command: Vec<String>,
    pub stdin: Option<String>,
}

impl ExecRecord {
    /// The shell script of a `sh -c` invocation, if that is what ran.
    pub fn script(&self) -> Option<&str> {
        match self.command.as_slice() {
            [sh, flag, script] if sh == "sh" && flag == "-c" => Some(script),
            _ => None,
        }
    }
}

#[derive(Default)]
struct State {
    workloads: HashMap<(String, String), Workload>,
    endpoints: HashMap<(String, String), Endpoint>,
    /// Workloads whose ready count was pinned by a test and must not
    /// track the desired replica count.
    pinned_ready: HashSet<(String, String)>,
    exec_log: Vec<ExecRecord>,
    fail_next: HashSet<String>,
    auto_assign_addresses: bool,
    next_address_octet: u8,
}

/// In-memory cluster; the standard test double and local-dev backend.
pub struct InMemoryCluster {
    state: Mutex<State>,
    exec_handler: Mutex<Option<ExecHandler>>,
}

impl Default for InMemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCluster {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                auto_assign_addresses: true,
                next_address_octet: 1,
                ..State::default()
            }),
            exec_handler: Mutex::new(None),
        }
    }

    /// Do not auto-assign endpoint addresses; callers must use
    /// [`InMemoryCluster::assign_address`].
    pub fn withhold_addresses(&self) {
        self.state.lock().unwrap().auto_assign_addresses = false;
    }

    /// Assign an external address to an existing endpoint.
    pub fn assign_address(&self, namespace: &str, name: &str, address: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(ep) = state
            .endpoints
            .get_mut(&(namespace.to_string(), name.to_string()))
        {
            ep.external_address = Some(address.to_string());
        }
    }

    /// Pin a workload's ready replica count, decoupling it from the
    /// desired count (e.g. to simulate a pod that never becomes ready).
    pub fn set_ready_replicas(&self, namespace: &str, name: &str, ready: u32) {
        let mut state = self.state.lock().unwrap();
        let key = (namespace.to_string(), name.to_string());
        if let Some(w) = state.workloads.get_mut(&key) {
            w.status.ready_replicas = ready;
        }
        state.pinned_ready.insert(key);
    }

    /// Make the next call of the named operation fail with an API error.
    pub fn fail_next_op(&self, op: &str) {
        self.state.lock().unwrap().fail_next.insert(op.to_string());
    }

    /// Install the function that produces exec output.
    pub fn set_exec_handler<F>(&self, handler: F)
    where
        F: Fn(&str, &ExecRequest) -> ExecOutput + Send + Sync + 'static,
    {
        *self.exec_handler.lock().unwrap() = Some(Box::new(handler));
    }

    /// Snapshot of every exec call so far, in invocation order.
    pub fn exec_log(&self) -> Vec<ExecRecord> {
        self.state.lock().unwrap().exec_log.clone()
    }

    fn check_fail(&self, state: &mut State, op: &str) -> ClusterResult<()> {
        if state.fail_next.remove(op) {
            return Err(ClusterError::Api {
                status: 500,
                message: format!("injected failure for {op}"),
            });
        }
        Ok(())
    }
}

fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn key(namespace: &str, name: &str) -> (String, String) {
    (namespace.to_string(), name.to_string())
}

/// Matches selectors of the form `label=value` against a label map.
fn selector_matches(selector: &str, labels: &BTreeMap<String, String>) -> bool {
    match selector.split_once('=') {
        Some((k, v)) => labels.get(k).is_some_and(|actual| actual == v),
        None => false,
    }
}

#[async_trait]
impl ClusterApi for InMemoryCluster {
    async fn get_workload(&self, namespace: &str, name: &str) -> ClusterResult<Option<Workload>> {
        let state = self.state.lock().unwrap();
        Ok(state.workloads.get(&key(namespace, name)).cloned())
    }

    async fn create_workload(&self, spec: &WorkloadSpec) -> ClusterResult<()> {
        let mut state = self.state.lock().unwrap();
        self.check_fail(&mut state, "create_workload")?;
        let k = key(&spec.namespace, &spec.name);
        if state.workloads.contains_key(&k) {
            return Err(ClusterError::AlreadyExists(spec.name.clone()));
        }
        state.workloads.insert(
            k,
            Workload {
                spec: spec.clone(),
                status: WorkloadStatus {
                    ready_replicas: spec.replicas,
                    created_at: epoch_secs(),
                },
            },
        );
        Ok(())
    }

    async fn update_workload(&self, spec: &WorkloadSpec) -> ClusterResult<()> {
        let mut state = self.state.lock().unwrap();
        self.check_fail(&mut state, "update_workload")?;
        let k = key(&spec.namespace, &spec.name);
        let pinned = state.pinned_ready.contains(&k);
        let Some(w) = state.workloads.get_mut(&k) else {
            return Err(ClusterError::NotFound(spec.name.clone()));
        };
        w.spec = spec.clone();
        if !pinned {
            w.status.ready_replicas = spec.replicas;
        }
        Ok(())
    }

    async fn delete_workload(&self, namespace: &str, name: &str) -> ClusterResult<bool> {
        let mut state = self.state.lock().unwrap();
        self.check_fail(&mut state, "delete_workload")?;
        let k = key(namespace, name);
        state.pinned_ready.remove(&k);
        Ok(state.workloads.remove(&k).is_some())
    }

    async fn list_workloads(&self, namespace: &str) -> ClusterResult<Vec<Workload>> {
        let state = self.state.lock().unwrap();
        let mut found: Vec<Workload> = state
            .workloads
            .values()
            .filter(|w| w.spec.namespace == namespace)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.spec.name.cmp(&b.spec.name));
        Ok(found)
    }

    async fn get_endpoint(&self, namespace: &str, name: &str) -> ClusterResult<Option<Endpoint>> {
        let state = self.state.lock().unwrap();
        Ok(state.endpoints.get(&key(namespace, name)).cloned())
    }

    async fn create_endpoint(&self, spec: &EndpointSpec) -> ClusterResult<()> {
        let mut state = self.state.lock().unwrap();
        self.check_fail(&mut state, "create_endpoint")?;
        let k = key(&spec.namespace, &spec.name);
        if state.endpoints.contains_key(&k) {
            return Err(ClusterError::AlreadyExists(spec.name.clone()));
        }
        let external_address = if state.auto_assign_addresses {
            let octet = state.next_address_octet;
            state.next_address_octet = state.next_address_octet.wrapping_add(1);
            Some(format!("203.0.113.{octet}"))
        } else {
            None
        };
        state.endpoints.insert(
            k,
            Endpoint {
                spec: spec.clone(),
                external_address,
            },
        );
        Ok(())
    }

    async fn delete_endpoint(&self, namespace: &str, name: &str) -> ClusterResult<bool> {
        let mut state = self.state.lock().unwrap();
        self.check_fail(&mut state, "delete_endpoint")?;
        Ok(state.endpoints.remove(&key(namespace, name)).is_some())
    }

    async fn list_pods(&self, namespace: &str, selector: &str) -> ClusterResult<Vec<PodInfo>> {
        let state = self.state.lock().unwrap();
        let mut pods = Vec::new();
        for w in state.workloads.values() {
            if w.spec.namespace != namespace || !selector_matches(selector, &w.spec.labels) {
                continue;
            }
            for i in 0..w.spec.replicas {
                pods.push(PodInfo {
                    name: format!("{}-{i}", w.spec.name),
                    ready: i < w.status.ready_replicas,
                });
            }
        }
        Ok(pods)
    }

    async fn exec(
        &self,
        namespace: &str,
        pod: &str,
        req: &ExecRequest,
    ) -> ClusterResult<ExecOutput> {
        {
            let mut state = self.state.lock().unwrap();
            self.check_fail(&mut state, "exec")?;
            let pod_exists = state.workloads.values().any(|w| {
                w.spec.namespace == namespace
                    && (0..w.spec.replicas).any(|i| format!("{}-{i}", w.spec.name) == pod)
            });
            if !pod_exists {
                return Err(ClusterError::NotFound(pod.to_string()));
            }
            state.exec_log.push(ExecRecord {
                pod: pod.to_string(),
                command: req.command.clone(),
                stdin: req.stdin.clone(),
            });
        }
        let handler = self.exec_handler.lock().unwrap();
        match handler.as_ref() {
            Some(h) => Ok(h(pod, req)),
            None => Ok(ExecOutput::ok("")),
        }
    }
}
