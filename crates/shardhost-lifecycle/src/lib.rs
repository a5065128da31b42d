//! shardhost-lifecycle — the server lifecycle state machine.
//!
//! A server moves through `absent → starting → running → pausing → paused
//! → resuming → running → stopped`; `stopped` tears everything down and the
//! id becomes absent again. The [`Orchestrator`] sequences the workload
//! controller and backup engine per transition:
//!
//! - `start` seeds a default config bundle for brand-new servers, creates
//!   the workload, and provisions (or reuses) the endpoint.
//! - `stop` best-effort-saves tracked config files, then deletes the
//!   workload and endpoint.
//! - `pause` takes a full snapshot (configs + world archive) while the
//!   server is still running, then scales to zero; the endpoint survives.
//! - `resume` scales back to one, waits for readiness, and rehydrates —
//!   world archive first, then individual files.
//!
//! Operations on the same server are mutually exclusive through an
//! advisory in-process lease; an overlapping call fails fast with
//! `Conflict` instead of racing.

mod error;
mod lease;
mod orchestrator;
mod types;

pub use error::{LifecycleError, LifecycleResult};
pub use lease::{LeaseGuard, ServerLeases};
pub use orchestrator::Orchestrator;
pub use types::{
    ConnectionInfo, PauseOutcome, ReplicaCounts, ResourceFigures, ResumeOutcome, ServerDetail,
    ServerSummary, StartOutcome, StopOutcome,
};
