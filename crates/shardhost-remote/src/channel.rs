//! RemoteFileChannel — shell-level file operations against a server's pod.

use std::sync::Arc;

use tracing::{debug, info};

use shard_core::{Namespace, ServerId};
use shardhost_cluster::{ClusterApi, ExecOutput, ExecRequest};

use crate::codec;
use crate::error::{RemoteError, RemoteResult};

/// File operations executed inside the single running container for a
/// server. Each operation resolves the pod fresh via the `app=<id>` label
/// selector, so a channel can outlive pod restarts.
pub struct RemoteFileChannel {
    api: Arc<dyn ClusterApi>,
    namespace: Namespace,
    server_id: ServerId,
}

impl RemoteFileChannel {
    pub fn new(api: Arc<dyn ClusterApi>, namespace: Namespace, server_id: ServerId) -> Self {
        Self {
            api,
            namespace,
            server_id,
        }
    }

    pub fn server_id(&self) -> &ServerId {
        &self.server_id
    }

    /// Resolve the single ready pod for this server.
    async fn find_pod(&self) -> RemoteResult<String> {
        let pods = self
            .api
            .list_pods(self.namespace.as_str(), &self.server_id.selector())
            .await?;
        pods.into_iter()
            .find(|p| p.ready)
            .map(|p| p.name)
            .ok_or_else(|| RemoteError::NoRunningInstance(self.server_id.to_string()))
    }

    async fn run(&self, path: &str, req: ExecRequest) -> RemoteResult<ExecOutput> {
        let pod = self.find_pod().await?;
        debug!(pod = %pod, command = ?req.command, "exec");
        let output = self.api.exec(self.namespace.as_str(), &pod, &req).await?;
        if !output.success() {
            return Err(RemoteError::CommandFailed {
                path: path.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }

    /// Read a text file from the container.
    pub async fn read_file(&self, path: &str) -> RemoteResult<String> {
        let script = format!("cat {}", quote(path));
        let output = self.run(path, ExecRequest::shell(script)).await?;
        Ok(output.stdout)
    }

    /// Write bytes to a file, creating parent directories as needed.
    ///
    /// Content streams through stdin base64-encoded, so binary data
    /// survives the text-oriented channel.
    pub async fn write_file(&self, path: &str, content: &[u8]) -> RemoteResult<()> {
        let script = match parent_dir(path) {
            Some(dir) => format!(
                "mkdir -p {} && base64 -d > {}",
                quote(&dir),
                quote(path)
            ),
            None => format!("base64 -d > {}", quote(path)),
        };
        let encoded = codec::encode(content);
        self.run(path, ExecRequest::shell_with_stdin(script, encoded))
            .await?;
        debug!(path, bytes = content.len(), "file written");
        Ok(())
    }

    /// Package a directory into one compressed, base64-encoded blob.
    ///
    /// Compression and encoding both happen inside the container, so the
    /// blob crosses the channel as a single text payload.
    pub async fn archive_directory(&self, path: &str) -> RemoteResult<String> {
        let (parent, name) = split_dir(path);
        let script = format!(
            "cd {} && tar czf - {} | base64 -w 0",
            quote(&parent),
            quote(&name)
        );
        let output = self.run(path, ExecRequest::shell(script)).await?;
        info!(path, encoded_len = output.stdout.len(), "directory archived");
        Ok(output.stdout.trim().to_string())
    }

    /// Replace a subdirectory wholesale from an archive blob: the existing
    /// directory is deleted, then the archive is extracted in its place.
    /// This is not a merge.
    pub async fn restore_archive(&self, blob: &str, destination_root: &str, dir_name: &str) -> RemoteResult<()> {
        // Validate the payload before shipping it into the container.
        codec::decode(blob).map_err(RemoteError::Decode)?;
        let target = format!("{destination_root}/{dir_name}");
        let script = format!(
            "mkdir -p {root} && rm -rf {target} && base64 -d | tar xzf - -C {root}",
            root = quote(destination_root),
            target = quote(&target),
        );
        self.run(&target, ExecRequest::shell_with_stdin(script, blob.to_string()))
            .await?;
        info!(target, "archive restored");
        Ok(())
    }

    /// List the entries of a directory, one name per line.
    pub async fn list_directory(&self, path: &str) -> RemoteResult<Vec<String>> {
        let script = format!("ls -1 {}", quote(path));
        let output = self.run(path, ExecRequest::shell(script)).await?;
        Ok(output
            .stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Create a directory and any missing parents.
    pub async fn mkdirs(&self, path: &str) -> RemoteResult<()> {
        let script = format!("mkdir -p {}", quote(path));
        self.run(path, ExecRequest::shell(script)).await?;
        Ok(())
    }
}

/// Single-quote a path for `sh -c`, escaping embedded quotes.
fn quote(path: &str) -> String {
    format!("'{}'", path.replace('\'', r"'\''"))
}

/// The parent directory of a path, if it has one.
fn parent_dir(path: &str) -> Option<String> {
    path.rsplit_once('/')
        .map(|(dir, _)| dir)
        .filter(|dir| !dir.is_empty())
        .map(str::to_string)
}

/// Split a directory path into `(parent, name)`; a bare name gets `.` as
/// its parent.
fn split_dir(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((parent, name)) if !parent.is_empty() => (parent.to_string(), name.to_string()),
        Some((_, name)) => ("/".to_string(), name.to_string()),
        None => (".".to_string(), path.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shardhost_cluster::{InMemoryCluster, WorkloadSpec};
    use std::collections::BTreeMap;

    fn spec(name: &str, replicas: u32) -> WorkloadSpec {
        WorkloadSpec {
            name: name.to_string(),
            namespace: "default".to_string(),
            image: "img:1".to_string(),
            cpu_millis: 1000,
            memory_mib: 2048,
            port: 25565,
            env: BTreeMap::new(),
            replicas,
            labels: BTreeMap::from([("app".to_string(), name.to_string())]),
        }
    }

    async fn channel_with_pod() -> (Arc<InMemoryCluster>, RemoteFileChannel) {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.create_workload(&spec("game-1", 1)).await.unwrap();
        let channel = RemoteFileChannel::new(
            cluster.clone(),
            Namespace::default(),
            ServerId::parse("game-1").unwrap(),
        );
        (cluster, channel)
    }

    #[test]
    fn quoting_wraps_and_escapes() {
        assert_eq!(quote("/data/world"), "'/data/world'");
        assert_eq!(quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn parent_dir_extraction() {
        assert_eq!(parent_dir("/data/ops.json"), Some("/data".to_string()));
        assert_eq!(parent_dir("/data/plugins/a.jar"), Some("/data/plugins".to_string()));
        assert_eq!(parent_dir("ops.json"), None);
    }

    #[test]
    fn split_dir_variants() {
        assert_eq!(split_dir("/data/world"), ("/data".to_string(), "world".to_string()));
        assert_eq!(split_dir("/world"), ("/".to_string(), "world".to_string()));
        assert_eq!(split_dir("world"), (".".to_string(), "world".to_string()));
    }

    #[tokio::test]
    async fn read_file_returns_stdout() {
        let (cluster, channel) = channel_with_pod().await;
        cluster.set_exec_handler(|_, req| {
            if req.command.last().is_some_and(|s| s.starts_with("cat")) {
                shardhost_cluster::ExecOutput::ok("motd=hi\n")
            } else {
                shardhost_cluster::ExecOutput::ok("")
            }
        });

        let content = channel.read_file("/data/server.properties").await.unwrap();
        assert_eq!(content, "motd=hi\n");
    }

    #[tokio::test]
    async fn read_file_failure_is_per_path() {
        let (cluster, channel) = channel_with_pod().await;
        cluster.set_exec_handler(|_, _| {
            shardhost_cluster::ExecOutput::failed(1, "cat: no such file")
        });

        let err = channel.read_file("/data/missing.json").await.unwrap_err();
        match err {
            RemoteError::CommandFailed { path, exit_code, .. } => {
                assert_eq!(path, "/data/missing.json");
                assert_eq!(exit_code, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn no_ready_pod_is_fatal() {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.create_workload(&spec("game-1", 1)).await.unwrap();
        cluster.set_ready_replicas("default", "game-1", 0);
        let channel = RemoteFileChannel::new(
            cluster,
            Namespace::default(),
            ServerId::parse("game-1").unwrap(),
        );

        let err = channel.read_file("/data/ops.json").await.unwrap_err();
        assert!(matches!(err, RemoteError::NoRunningInstance(_)));
    }

    #[tokio::test]
    async fn write_file_streams_encoded_stdin() {
        let (cluster, channel) = channel_with_pod().await;

        channel.write_file("/data/ops.json", b"[]").await.unwrap();

        let log = cluster.exec_log();
        assert_eq!(log.len(), 1);
        let script = log[0].script().unwrap();
        assert!(script.contains("mkdir -p '/data'"));
        assert!(script.contains("base64 -d > '/data/ops.json'"));
        let stdin = log[0].stdin.as_deref().unwrap();
        assert_eq!(codec::decode(stdin).unwrap(), b"[]");
    }

    #[tokio::test]
    async fn archive_directory_compresses_in_container() {
        let (cluster, channel) = channel_with_pod().await;
        let blob = codec::encode(b"pretend-tarball");
        let blob_clone = blob.clone();
        cluster.set_exec_handler(move |_, req| {
            if req.command.last().is_some_and(|s| s.contains("tar czf")) {
                shardhost_cluster::ExecOutput::ok(format!("{blob_clone}\n"))
            } else {
                shardhost_cluster::ExecOutput::ok("")
            }
        });

        let archived = channel.archive_directory("/data/world").await.unwrap();
        assert_eq!(archived, blob);

        let script_log = cluster.exec_log();
        let script = script_log[0].script().unwrap();
        assert!(script.contains("cd '/data'"));
        assert!(script.contains("tar czf - 'world'"));
        assert!(script.contains("base64 -w 0"));
    }

    #[tokio::test]
    async fn restore_archive_deletes_then_extracts() {
        let (cluster, channel) = channel_with_pod().await;
        let blob = codec::encode(b"pretend-tarball");

        channel.restore_archive(&blob, "/data", "world").await.unwrap();

        let log = cluster.exec_log();
        let script = log[0].script().unwrap();
        // Wholesale replacement: the old directory goes away first.
        let rm_pos = script.find("rm -rf '/data/world'").unwrap();
        let extract_pos = script.find("tar xzf").unwrap();
        assert!(rm_pos < extract_pos);
        assert_eq!(log[0].stdin.as_deref(), Some(blob.as_str()));
    }

    #[tokio::test]
    async fn restore_archive_rejects_malformed_blob() {
        let (_cluster, channel) = channel_with_pod().await;
        let err = channel
            .restore_archive("!!not-base64!!", "/data", "world")
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn list_directory_splits_lines() {
        let (cluster, channel) = channel_with_pod().await;
        cluster.set_exec_handler(|_, _| {
            shardhost_cluster::ExecOutput::ok("world\nserver.properties\nops.json\n")
        });

        let entries = channel.list_directory("/data").await.unwrap();
        assert_eq!(entries, vec!["world", "server.properties", "ops.json"]);
    }

    #[tokio::test]
    async fn mkdirs_issues_mkdir_p() {
        let (cluster, channel) = channel_with_pod().await;
        channel.mkdirs("/data/plugins").await.unwrap();
        let log = cluster.exec_log();
        assert_eq!(log[0].script(), Some("mkdir -p '/data/plugins'"));
    }
}
