//! Cluster resource types.
//!
//! These mirror the cluster agent's wire format: a workload is one
//! replicated container, an endpoint is an externally reachable
//! address/port pair bound to a selector, pods are the running instances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Workloads ──────────────────────────────────────────────────────

/// Desired state of a server workload: one container with fixed resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadSpec {
    pub name: String,
    pub namespace: String,
    /// Container image reference.
    pub image: String,
    /// CPU request and limit, in millicores.
    pub cpu_millis: u32,
    /// Memory request and limit, in MiB.
    pub memory_mib: u32,
    /// Container port.
    pub port: u16,
    /// Environment variables injected into the container.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Desired replica count (0 or 1 for game servers).
    pub replicas: u32,
    /// Selector labels; pods carry the same set.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

/// Observed state of a workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadStatus {
    pub ready_replicas: u32,
    /// Unix timestamp (seconds) when the workload was created.
    pub created_at: u64,
}

/// A workload as reported by the cluster: spec plus observed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub spec: WorkloadSpec,
    pub status: WorkloadStatus,
}

// ── Endpoints ──────────────────────────────────────────────────────

/// How an endpoint's external address is allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    /// Address shared with other endpoints behind a common ingress.
    Shared,
    /// Dedicated externally reachable address for this endpoint.
    Dedicated,
}

/// Desired state of a network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    pub name: String,
    pub namespace: String,
    pub port: u16,
    /// Label selector binding the endpoint to a workload's pods.
    pub selector: String,
    pub allocation: AllocationMethod,
}

/// An endpoint as reported by the cluster. The external address stays
/// `None` until the cluster finishes allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub spec: EndpointSpec,
    pub external_address: Option<String>,
}

// ── Pods ───────────────────────────────────────────────────────────

/// A running (or pending) container instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    pub name: String,
    pub ready: bool,
}

// ── Exec ───────────────────────────────────────────────────────────

/// A command execution request against a single pod. The channel is
/// text-oriented: stdin and stdout carry UTF-8, so binary payloads must
/// be base64-encoded by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecRequest {
    pub command: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdin: Option<String>,
}

impl ExecRequest {
    /// A `sh -c` invocation with no stdin.
    pub fn shell(script: impl Into<String>) -> Self {
        Self {
            command: vec!["sh".to_string(), "-c".to_string(), script.into()],
            stdin: None,
        }
    }

    /// A `sh -c` invocation fed from stdin.
    pub fn shell_with_stdin(script: impl Into<String>, stdin: impl Into<String>) -> Self {
        Self {
            command: vec!["sh".to_string(), "-c".to_string(), script.into()],
            stdin: Some(stdin.into()),
        }
    }
}

/// Captured output of a command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl ExecOutput {
    /// A successful execution with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: 0,
        }
    }

    /// A failed execution with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
