//! shardhost-backup — moves server state between a live container and the
//! durable artifact store.
//!
//! Backup reads tracked config files (and, for a full snapshot, the world
//! directory as one archive blob) out of the container and puts them into
//! the store. Restore rehydrates a fresh container: the bulk archive is
//! extracted first, then individual files are written on top — the archive
//! replaces its destination subdirectory wholesale, so this order is a hard
//! requirement. Per-item failures are logged and skipped; only a missing
//! running instance aborts the whole call.

mod engine;
mod error;

pub use engine::BackupEngine;
pub use error::{BackupError, BackupResult};
