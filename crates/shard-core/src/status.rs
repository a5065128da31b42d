//! Display status derived from workload replica counts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// User-facing server status, projected from `(ready, desired)` replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    Running,
    Paused,
    Starting,
    Degraded,
    Unknown,
}

impl DisplayStatus {
    /// Derive the display status from replica counts.
    ///
    /// Both zero means the workload is parked (paused); a fully ready
    /// workload is running; a workload with desired replicas but none ready
    /// is starting; partially ready is degraded.
    pub fn derive(ready: u32, desired: u32) -> Self {
        match (ready, desired) {
            (0, 0) => DisplayStatus::Paused,
            (r, d) if d > 0 && r == d => DisplayStatus::Running,
            (0, d) if d > 0 => DisplayStatus::Starting,
            (r, d) if r < d => DisplayStatus::Degraded,
            _ => DisplayStatus::Unknown,
        }
    }
}

impl fmt::Display for DisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayStatus::Running => "running",
            DisplayStatus::Paused => "paused",
            DisplayStatus::Starting => "starting",
            DisplayStatus::Degraded => "degraded",
            DisplayStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
