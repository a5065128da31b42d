//! redb table definitions for the artifact store.

use redb::TableDefinition;

/// Artifact blobs keyed by `{server_id}/{relative_path}`.
///
/// redb iterates `&str` keys in lexicographic order, so all artifacts of one
/// server form a contiguous key range under its `{server_id}/` prefix.
pub const ARTIFACTS: TableDefinition<&str, &[u8]> = TableDefinition::new("artifacts");
