//! shardhost-store — durable artifact store for server state.
//!
//! A namespaced blob store keyed by `(server_id, relative_path)`, backed by
//! redb. Holds the config files and the bulk world archive that survive a
//! server's container being wiped. Writes overwrite; there is no delete and
//! no versioning — old artifacts persist until the next backup replaces them.

mod error;
mod store;
mod tables;

pub use error::{StoreError, StoreResult};
pub use store::{ArtifactContent, ArtifactStore};
