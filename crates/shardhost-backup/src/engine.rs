//! BackupEngine — snapshot and rehydrate one server's state.

use tracing::{info, warn};

use shard_core::layout::{self, WORLD_ARCHIVE_KEY, WORLD_DIR};
use shardhost_remote::{RemoteError, RemoteFileChannel};
use shardhost_store::{ArtifactContent, ArtifactStore};

use crate::error::BackupResult;

/// Moves files between one server's container and the artifact store.
///
/// Constructed per operation with the channel already bound to the server;
/// the store handle is shared process-wide.
pub struct BackupEngine {
    channel: RemoteFileChannel,
    store: ArtifactStore,
}

impl BackupEngine {
    pub fn new(channel: RemoteFileChannel, store: ArtifactStore) -> Self {
        Self { channel, store }
    }

    /// Back up the tracked config files. Best-effort per file: empty or
    /// unreadable files are skipped with a warning. Returns the relative
    /// paths actually saved.
    pub async fn backup_config(&self, files: &[&str]) -> BackupResult<Vec<String>> {
        let server_id = self.channel.server_id().clone();
        let mut saved = Vec::new();

        for relative in files {
            let container = layout::container_path(relative);
            let content = match self.channel.read_file(&container).await {
                Ok(content) => content,
                Err(RemoteError::CommandFailed { exit_code, stderr, .. }) => {
                    warn!(%server_id, path = %relative, exit_code, %stderr, "config file unreadable, skipping");
                    continue;
                }
                // No running instance (or a cluster fault) ends the call.
                Err(fatal) => return Err(fatal.into()),
            };
            if content.is_empty() {
                warn!(%server_id, path = %relative, "config file empty, skipping");
                continue;
            }
            match self
                .store
                .put(&server_id, relative, &ArtifactContent::Text(content))
            {
                Ok(()) => saved.push(relative.to_string()),
                Err(e) => {
                    warn!(%server_id, path = %relative, error = %e, "failed to store config file");
                }
            }
        }

        info!(%server_id, saved = saved.len(), "config backup finished");
        Ok(saved)
    }

    /// Full snapshot: tracked config files plus the world directory as a
    /// single archive blob under the reserved key.
    pub async fn backup_full(&self, files: &[&str]) -> BackupResult<Vec<String>> {
        let mut saved = self.backup_config(files).await?;
        let server_id = self.channel.server_id().clone();

        match self.channel.archive_directory(&layout::world_path()).await {
            Ok(blob) if !blob.is_empty() => {
                match self
                    .store
                    .put(&server_id, WORLD_ARCHIVE_KEY, &ArtifactContent::Text(blob))
                {
                    Ok(()) => saved.push(WORLD_ARCHIVE_KEY.to_string()),
                    Err(e) => {
                        warn!(%server_id, error = %e, "failed to store world archive");
                    }
                }
            }
            Ok(_) => {
                warn!(%server_id, "world archive came back empty, skipping");
            }
            Err(RemoteError::CommandFailed { exit_code, stderr, .. }) => {
                warn!(%server_id, exit_code, %stderr, "world archive failed, skipping");
            }
            Err(fatal) => return Err(fatal.into()),
        }

        info!(%server_id, saved = saved.len(), "full backup finished");
        Ok(saved)
    }

    /// Rehydrate a fresh container from the store.
    ///
    /// The bulk archive (if present) is restored before any individual
    /// file: archive extraction replaces the world subdirectory wholesale
    /// and would clobber files written under it earlier. Placeholder
    /// entries (keys ending `/`) and the archive key itself are never
    /// written as files. Returns the keys restored, in restoration order.
    pub async fn restore(&self) -> BackupResult<Vec<String>> {
        let server_id = self.channel.server_id().clone();
        let keys = self.store.list(&server_id)?;
        let mut restored = Vec::new();

        if keys.iter().any(|k| k == WORLD_ARCHIVE_KEY) {
            match self.store.get(&server_id, WORLD_ARCHIVE_KEY, false) {
                Ok(content) => {
                    let blob = String::from_utf8_lossy(content.as_bytes()).into_owned();
                    match self
                        .channel
                        .restore_archive(&blob, layout::DATA_ROOT, WORLD_DIR)
                        .await
                    {
                        Ok(()) => restored.push(WORLD_ARCHIVE_KEY.to_string()),
                        Err(RemoteError::NoRunningInstance(_)) => {
                            return Err(RemoteError::NoRunningInstance(server_id.to_string()).into());
                        }
                        Err(e) => {
                            warn!(%server_id, error = %e, "world archive restore failed, continuing");
                        }
                    }
                }
                Err(e) => {
                    warn!(%server_id, error = %e, "world archive unreadable, continuing");
                }
            }
        }

        for key in &keys {
            if key == WORLD_ARCHIVE_KEY || key.ends_with('/') {
                continue;
            }
            let content = match self.store.get(&server_id, key, true) {
                Ok(content) => content,
                Err(e) => {
                    warn!(%server_id, path = %key, error = %e, "artifact unreadable, skipping");
                    continue;
                }
            };
            let container = layout::container_path(key);
            match self.channel.write_file(&container, content.as_bytes()).await {
                Ok(()) => restored.push(key.clone()),
                Err(RemoteError::NoRunningInstance(_)) => {
                    return Err(RemoteError::NoRunningInstance(server_id.to_string()).into());
                }
                Err(e) => {
                    warn!(%server_id, path = %key, error = %e, "file restore failed, skipping");
                }
            }
        }

        info!(%server_id, restored = restored.len(), "restore finished");
        Ok(restored)
    }
}
