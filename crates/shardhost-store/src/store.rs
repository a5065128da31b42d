//! ArtifactStore — redb-backed blob persistence for server state.
//!
//! Keys are composed as `{server_id}/{relative_path}` on write, and `list`
//! strips that prefix exactly once; `get` and `put` only ever see
//! server-relative paths. The store supports both on-disk and in-memory
//! backends (the latter for testing).

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::debug;

use shard_core::ServerId;

use crate::error::{StoreError, StoreResult};
use crate::tables::ARTIFACTS;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Content of a single stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactContent {
    Text(String),
    Binary(Vec<u8>),
}

impl ArtifactContent {
    /// Raw bytes of the content, regardless of flavor.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            ArtifactContent::Text(s) => s.as_bytes(),
            ArtifactContent::Binary(b) => b,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Thread-safe artifact store backed by redb.
#[derive(Clone)]
pub struct ArtifactStore {
    db: Arc<Database>,
}

impl ArtifactStore {
    /// Open (or create) a persistent artifact store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "artifact store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory artifact store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory artifact store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        // Opening a table in a write transaction creates it if absent.
        txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Create or overwrite an artifact. No versioning.
    pub fn put(
        &self,
        server_id: &ServerId,
        relative_path: &str,
        content: &ArtifactContent,
    ) -> StoreResult<()> {
        validate_relative_path(relative_path)?;
        let key = storage_key(server_id, relative_path);
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), content.as_bytes())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(%key, bytes = content.as_bytes().len(), "artifact stored");
        Ok(())
    }

    /// Fetch an artifact's content. The caller declares whether the bytes
    /// are text (UTF-8 checked) or opaque binary.
    pub fn get(
        &self,
        server_id: &ServerId,
        relative_path: &str,
        binary: bool,
    ) -> StoreResult<ArtifactContent> {
        validate_relative_path(relative_path)?;
        let key = storage_key(server_id, relative_path);
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        let guard = table
            .get(key.as_str())
            .map_err(map_err!(Read))?
            .ok_or_else(|| StoreError::NotFound(key.clone()))?;
        let bytes = guard.value().to_vec();
        if binary {
            Ok(ArtifactContent::Binary(bytes))
        } else {
            let text = String::from_utf8(bytes).map_err(|_| StoreError::NotText(key))?;
            Ok(ArtifactContent::Text(text))
        }
    }

    /// List all artifact paths for a server, relative to its prefix,
    /// in stable (lexicographic) order.
    pub fn list(&self, server_id: &ServerId) -> StoreResult<Vec<String>> {
        let prefix = format!("{server_id}/");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ARTIFACTS).map_err(map_err!(Table))?;
        let mut paths = Vec::new();
        for entry in table.range(prefix.as_str()..).map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            // The range is lexicographically contiguous; the first key that
            // no longer carries the prefix ends this server's slice.
            let Some(relative) = key.value().strip_prefix(prefix.as_str()) else {
                break;
            };
            paths.push(relative.to_string());
        }
        Ok(paths)
    }

    /// Whether the store holds any artifact for this server.
    pub fn is_empty_for(&self, server_id: &ServerId) -> StoreResult<bool> {
        Ok(self.list(server_id)?.is_empty())
    }
}

fn storage_key(server_id: &ServerId, relative_path: &str) -> String {
    format!("{server_id}/{relative_path}")
}

/// Reject paths that would escape the server's prefix.
fn validate_relative_path(path: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.starts_with('/') {
        return Err(invalid("path must be relative"));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(invalid("path must not contain '..' segments"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ArtifactStore {
        ArtifactStore::open_in_memory().unwrap()
    }

    fn sid(raw: &str) -> ServerId {
        ServerId::parse(raw).unwrap()
    }

    fn text(s: &str) -> ArtifactContent {
        ArtifactContent::Text(s.to_string())
    }

    #[test]
    fn put_list_get_round_trip_text() {
        let store = store();
        let id = sid("game-1");

        store.put(&id, "server.properties", &text("motd=hi\n")).unwrap();
        store.put(&id, "ops.json", &text("[]")).unwrap();

        let listed = store.list(&id).unwrap();
        assert_eq!(listed, vec!["ops.json", "server.properties"]);

        let got = store.get(&id, "server.properties", false).unwrap();
        assert_eq!(got, text("motd=hi\n"));
    }

    #[test]
    fn round_trip_binary() {
        let store = store();
        let id = sid("game-1");
        let blob = ArtifactContent::Binary(vec![0u8, 159, 146, 150, 255]);

        store.put(&id, "world.tar.gz.b64", &blob).unwrap();
        let got = store.get(&id, "world.tar.gz.b64", true).unwrap();
        assert_eq!(got, blob);
    }

    #[test]
    fn list_strips_prefix_exactly_once() {
        let store = store();
        let id = sid("game-1");

        // A nested path that itself begins with the server id must keep
        // its inner occurrence intact.
        store.put(&id, "game-1/nested.txt", &text("x")).unwrap();
        let listed = store.list(&id).unwrap();
        assert_eq!(listed, vec!["game-1/nested.txt"]);
    }

    #[test]
    fn list_does_not_leak_across_servers() {
        let store = store();
        let a = sid("game-1");
        // "game-10" shares "game-1" as a string prefix but not as a key prefix.
        let b = sid("game-10");

        store.put(&a, "a.txt", &text("a")).unwrap();
        store.put(&b, "b.txt", &text("b")).unwrap();

        assert_eq!(store.list(&a).unwrap(), vec!["a.txt"]);
        assert_eq!(store.list(&b).unwrap(), vec!["b.txt"]);
    }

    #[test]
    fn put_overwrites_without_versioning() {
        let store = store();
        let id = sid("game-1");

        store.put(&id, "ops.json", &text("[]")).unwrap();
        store.put(&id, "ops.json", &text("[\"admin\"]")).unwrap();

        assert_eq!(store.list(&id).unwrap().len(), 1);
        let got = store.get(&id, "ops.json", false).unwrap();
        assert_eq!(got, text("[\"admin\"]"));
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = store();
        let err = store.get(&sid("game-1"), "nope.txt", false).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn rejects_absolute_and_traversal_paths() {
        let store = store();
        let id = sid("game-1");

        let err = store.put(&id, "/etc/passwd", &text("x")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));

        let err = store.put(&id, "../other/secret", &text("x")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));

        let err = store.put(&id, "a/../b", &text("x")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath { .. }));
    }

    #[test]
    fn binary_flagged_get_of_text_content_returns_bytes() {
        let store = store();
        let id = sid("game-1");
        store.put(&id, "notes.txt", &text("hello")).unwrap();

        let got = store.get(&id, "notes.txt", true).unwrap();
        assert_eq!(got, ArtifactContent::Binary(b"hello".to_vec()));
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts.redb");
        let id = sid("game-1");

        {
            let store = ArtifactStore::open(&path).unwrap();
            store.put(&id, "ops.json", &text("[]")).unwrap();
        }

        let store = ArtifactStore::open(&path).unwrap();
        assert_eq!(store.list(&id).unwrap(), vec!["ops.json"]);
    }

    #[test]
    fn empty_check() {
        let store = store();
        let id = sid("game-1");
        assert!(store.is_empty_for(&id).unwrap());
        store.put(&id, "ops.json", &text("[]")).unwrap();
        assert!(!store.is_empty_for(&id).unwrap());
    }
}
