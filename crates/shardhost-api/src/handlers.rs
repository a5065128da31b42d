//! REST API handlers.
//!
//! Each handler validates identifiers, delegates to the orchestrator, and
//! shapes the JSON response. Lifecycle errors convert into `ApiError` and
//! pick their status code by variant.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use tracing::info;

use shard_core::{GamePackage, Namespace, ServerId};
use shardhost_lifecycle::{ConnectionInfo, ServerDetail, ServerSummary};

use crate::ApiState;
use crate::error::ApiError;

// ── Request bodies ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StartServerRequest {
    pub package: String,
    pub server_id: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerRequest {
    pub server_id: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// Namespace selector for the read-only routes.
#[derive(Debug, Deserialize)]
pub struct NamespaceQuery {
    #[serde(default)]
    pub namespace: Option<String>,
}

// ── Response bodies ────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct StartServerResponse {
    pub message: String,
    pub files_restored: bool,
    pub existing_files: Vec<String>,
    pub connection_info: ConnectionBody,
}

#[derive(Debug, Serialize)]
pub struct StopServerResponse {
    pub message: String,
    pub files_saved: Vec<String>,
}

#[derive(Serialize)]
pub struct PauseServerResponse {
    pub message: String,
    pub files_saved: Vec<String>,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ResumeServerResponse {
    pub message: String,
    pub status: &'static str,
    pub files_restored: Vec<String>,
    pub connection_info: ConnectionBody,
}

#[derive(Serialize)]
pub struct ListServersResponse {
    pub servers: Vec<ServerSummary>,
    pub total_count: usize,
}

/// Wire shape of a connection endpoint.
#[derive(Debug, Serialize)]
pub struct ConnectionBody {
    pub ip: Option<String>,
    pub port: u16,
}

impl From<ConnectionInfo> for ConnectionBody {
    fn from(c: ConnectionInfo) -> Self {
        Self { ip: c.ip, port: c.port }
    }
}

// ── Validation ─────────────────────────────────────────────────────

fn parse_server_id(raw: &str) -> Result<ServerId, ApiError> {
    ServerId::parse(raw).map_err(|e| ApiError::validation(format!("server_id: {e}")))
}

fn parse_namespace(raw: Option<&str>) -> Result<Namespace, ApiError> {
    match raw {
        Some(raw) => {
            Namespace::parse(raw).map_err(|e| ApiError::validation(format!("namespace: {e}")))
        }
        None => Ok(Namespace::default()),
    }
}

fn parse_package(raw: &str) -> Result<GamePackage, ApiError> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|_| ApiError::validation(format!("unknown package: {raw}")))
}

// ── Lifecycle handlers ─────────────────────────────────────────────

/// POST /api/server/start-server
pub async fn start_server(
    State(state): State<ApiState>,
    Json(req): Json<StartServerRequest>,
) -> Result<Json<StartServerResponse>, ApiError> {
    let package = parse_package(&req.package)?;
    let server_id = parse_server_id(&req.server_id)?;
    let namespace = parse_namespace(req.namespace.as_deref())?;

    info!(%server_id, %namespace, package = %req.package, "start requested");
    let outcome = state
        .orchestrator
        .start(&server_id, package, &namespace)
        .await?;

    Ok(Json(StartServerResponse {
        message: format!("Server {server_id} for package {} is starting...", req.package),
        files_restored: outcome.restored,
        existing_files: outcome.existing_files,
        connection_info: outcome.connection.into(),
    }))
}

/// POST /api/server/stop-server
pub async fn stop_server(
    State(state): State<ApiState>,
    Json(req): Json<ServerRequest>,
) -> Result<Json<StopServerResponse>, ApiError> {
    let server_id = parse_server_id(&req.server_id)?;
    let namespace = parse_namespace(req.namespace.as_deref())?;

    info!(%server_id, %namespace, "stop requested");
    let outcome = state.orchestrator.stop(&server_id, &namespace).await?;

    Ok(Json(StopServerResponse {
        message: format!("Server {server_id} stopped"),
        files_saved: outcome.files_saved,
    }))
}

/// POST /api/server/pause-server
pub async fn pause_server(
    State(state): State<ApiState>,
    Json(req): Json<ServerRequest>,
) -> Result<Json<PauseServerResponse>, ApiError> {
    let server_id = parse_server_id(&req.server_id)?;
    let namespace = parse_namespace(req.namespace.as_deref())?;

    info!(%server_id, %namespace, "pause requested");
    let outcome = state.orchestrator.pause(&server_id, &namespace).await?;

    Ok(Json(PauseServerResponse {
        message: format!("Server {server_id} paused"),
        files_saved: outcome.files_saved,
        status: "paused",
    }))
}

/// POST /api/server/resume-server
pub async fn resume_server(
    State(state): State<ApiState>,
    Json(req): Json<ServerRequest>,
) -> Result<Json<ResumeServerResponse>, ApiError> {
    let server_id = parse_server_id(&req.server_id)?;
    let namespace = parse_namespace(req.namespace.as_deref())?;

    info!(%server_id, %namespace, "resume requested");
    let outcome = state.orchestrator.resume(&server_id, &namespace).await?;

    Ok(Json(ResumeServerResponse {
        message: format!("Server {server_id} resumed"),
        status: "running",
        files_restored: outcome.files_restored,
        connection_info: outcome.connection.into(),
    }))
}

// ── Read-only handlers ─────────────────────────────────────────────

/// GET /api/server/
pub async fn list_servers(
    State(state): State<ApiState>,
    Query(query): Query<NamespaceQuery>,
) -> Result<Json<ListServersResponse>, ApiError> {
    let namespace = parse_namespace(query.namespace.as_deref())?;
    let servers = state.orchestrator.list(&namespace).await?;
    let total_count = servers.len();
    Ok(Json(ListServersResponse {
        servers,
        total_count,
    }))
}

/// GET /api/server/status/{id}
pub async fn server_status(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<NamespaceQuery>,
) -> Result<Json<ServerDetail>, ApiError> {
    let server_id = parse_server_id(&id)?;
    let namespace = parse_namespace(query.namespace.as_deref())?;
    let detail = state.orchestrator.status(&server_id, &namespace).await?;
    Ok(Json(detail))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "healthy" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use shard_core::ProfileTable;
    use shardhost_cluster::{ExecOutput, InMemoryCluster, PollPolicy};
    use shardhost_lifecycle::Orchestrator;
    use shardhost_remote::codec;
    use shardhost_store::ArtifactStore;

    fn container_handler(_pod: &str, req: &shardhost_cluster::ExecRequest) -> ExecOutput {
        let script = req.command.last().map(String::as_str).unwrap_or("");
        if let Some(rest) = script.strip_prefix("cat '") {
            let path = rest.trim_end_matches('\'');
            return match path {
                "/data/server.properties" => ExecOutput::ok("motd=hi\n"),
                "/data/ops.json" => ExecOutput::ok("[]"),
                _ => ExecOutput::failed(1, format!("cat: {path}: No such file")),
            };
        }
        if script.contains("tar czf") {
            return ExecOutput::ok(codec::encode(b"world-bytes"));
        }
        ExecOutput::ok("")
    }

    fn test_state() -> ApiState {
        let cluster = Arc::new(InMemoryCluster::new());
        cluster.set_exec_handler(container_handler);
        let fast = PollPolicy::new(3, Duration::from_millis(1));
        let orchestrator = Orchestrator::new(
            cluster,
            ArtifactStore::open_in_memory().unwrap(),
            ProfileTable::builtin(),
        )
        .with_timing(fast, fast, Duration::from_secs(5));
        ApiState {
            orchestrator: Arc::new(orchestrator),
        }
    }

    fn start_req(server_id: &str) -> StartServerRequest {
        StartServerRequest {
            package: "standard".to_string(),
            server_id: server_id.to_string(),
            namespace: None,
        }
    }

    fn server_req(server_id: &str) -> ServerRequest {
        ServerRequest {
            server_id: server_id.to_string(),
            namespace: None,
        }
    }

    async fn body_text(resp: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn start_new_server_seeds_and_responds() {
        let state = test_state();
        let resp = start_server(State(state), Json(start_req("game-1")))
            .await
            .unwrap();
        assert!(!resp.files_restored);
        assert_eq!(resp.existing_files.len(), 5);
        assert!(resp.connection_info.ip.is_some());
        assert_eq!(resp.connection_info.port, 25565);
    }

    #[tokio::test]
    async fn start_duplicate_returns_conflict() {
        let state = test_state();
        start_server(State(state.clone()), Json(start_req("game-1")))
            .await
            .unwrap();

        let err = start_server(State(state), Json(start_req("game-1")))
            .await
            .unwrap_err();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn start_invalid_server_id_is_rejected_with_rule() {
        let state = test_state();
        let err = start_server(State(state), Json(start_req("Game_1")))
            .await
            .unwrap_err();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_text(resp).await;
        assert!(body.contains("lowercase"));
    }

    #[tokio::test]
    async fn start_overlong_server_id_is_rejected() {
        let state = test_state();
        let err = start_server(State(state), Json(start_req(&"a".repeat(51))))
            .await
            .unwrap_err();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn start_unknown_package_is_rejected() {
        let state = test_state();
        let mut req = start_req("game-1");
        req.package = "premium".to_string();

        let err = start_server(State(state), Json(req)).await.unwrap_err();
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_text(resp).await;
        assert!(body.contains("unknown package"));
    }

    #[tokio::test]
    async fn start_invalid_namespace_is_rejected() {
        let state = test_state();
        let mut req = start_req("game-1");
        req.namespace = Some("Bad_NS".to_string());

        let err = start_server(State(state), Json(req)).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stop_after_start_reports_saved_files() {
        let state = test_state();
        start_server(State(state.clone()), Json(start_req("game-1")))
            .await
            .unwrap();

        let resp = stop_server(State(state), Json(server_req("game-1")))
            .await
            .unwrap();
        assert_eq!(resp.files_saved, vec!["server.properties", "ops.json"]);
    }

    #[tokio::test]
    async fn stop_missing_server_is_not_found() {
        let state = test_state();
        let err = stop_server(State(state), Json(server_req("ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn pause_resume_cycle_over_http() {
        let state = test_state();
        let started = start_server(State(state.clone()), Json(start_req("game-1")))
            .await
            .unwrap();

        let paused = pause_server(State(state.clone()), Json(server_req("game-1")))
            .await
            .unwrap();
        assert_eq!(paused.status, "paused");
        assert!(paused
            .files_saved
            .contains(&shard_core::layout::WORLD_ARCHIVE_KEY.to_string()));

        let resumed = resume_server(State(state), Json(server_req("game-1")))
            .await
            .unwrap();
        assert_eq!(resumed.status, "running");
        assert_eq!(
            resumed.files_restored.first().map(String::as_str),
            Some(shard_core::layout::WORLD_ARCHIVE_KEY)
        );
        assert_eq!(resumed.connection_info.ip, started.connection_info.ip);
    }

    #[tokio::test]
    async fn resume_missing_server_is_not_found() {
        let state = test_state();
        let err = resume_server(State(state), Json(server_req("ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_counts_servers() {
        let state = test_state();
        start_server(State(state.clone()), Json(start_req("game-1")))
            .await
            .unwrap();
        start_server(State(state.clone()), Json(start_req("game-2")))
            .await
            .unwrap();

        let resp = list_servers(
            State(state),
            Query(NamespaceQuery { namespace: None }),
        )
        .await
        .unwrap();
        assert_eq!(resp.total_count, 2);
        assert_eq!(resp.servers.len(), 2);
    }

    #[tokio::test]
    async fn status_returns_detail_or_404() {
        let state = test_state();
        start_server(State(state.clone()), Json(start_req("game-1")))
            .await
            .unwrap();

        let detail = server_status(
            State(state.clone()),
            Path("game-1".to_string()),
            Query(NamespaceQuery { namespace: None }),
        )
        .await
        .unwrap();
        assert_eq!(detail.server_id, "game-1");
        assert_eq!(detail.pods.len(), 1);

        let err = server_status(
            State(state),
            Path("ghost".to_string()),
            Query(NamespaceQuery { namespace: None }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn health_is_healthy() {
        let resp = health().await;
        assert_eq!(resp.0["status"], "healthy");
    }
}
