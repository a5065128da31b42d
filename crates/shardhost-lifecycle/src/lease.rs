//! Per-server advisory leases.
//!
//! A cooperative in-process mutual-exclusion set keyed by
//! `{namespace}/{server_id}`. Acquisition is non-blocking: a second
//! concurrent operation on the same server fails immediately rather than
//! queueing behind the first.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// The set of servers with an operation currently in flight.
#[derive(Clone, Default)]
pub struct ServerLeases {
    held: Arc<Mutex<HashSet<String>>>,
}

impl ServerLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to acquire the lease for a key. Returns `None` if an operation
    /// already holds it.
    pub fn acquire(&self, key: &str) -> Option<LeaseGuard> {
        let mut held = self.held.lock().unwrap();
        if !held.insert(key.to_string()) {
            return None;
        }
        Some(LeaseGuard {
            key: key.to_string(),
            held: Arc::clone(&self.held),
        })
    }

    /// Whether the key is currently leased (for diagnostics).
    pub fn is_held(&self, key: &str) -> bool {
        self.held.lock().unwrap().contains(key)
    }
}

/// Releases the lease on drop.
pub struct LeaseGuard {
    key: String,
    held: Arc<Mutex<HashSet<String>>>,
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        self.held.lock().unwrap().remove(&self.key);
    }
}
