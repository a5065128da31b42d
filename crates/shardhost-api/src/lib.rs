//! shardhost-api — REST surface for Shardhost.
//!
//! Provides axum route handlers for the server lifecycle. Identifiers are
//! validated before any side effect; lifecycle errors map to status codes
//! by variant, never by message text.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/server/start-server` | Start a server |
//! | POST | `/api/server/stop-server` | Stop a server (config backup + teardown) |
//! | POST | `/api/server/pause-server` | Snapshot and scale to zero |
//! | POST | `/api/server/resume-server` | Scale up and rehydrate |
//! | GET | `/api/server/` | List servers in a namespace |
//! | GET | `/api/server/status/{id}` | Detailed status for one server |
//! | GET | `/health` | Liveness probe |

pub mod handlers;

mod error;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};

use shardhost_lifecycle::Orchestrator;

pub use error::ApiError;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the complete API router.
pub fn build_router(orchestrator: Arc<Orchestrator>) -> Router {
    let state = ApiState { orchestrator };

    let server_routes = Router::new()
        .route("/start-server", post(handlers::start_server))
        .route("/stop-server", post(handlers::stop_server))
        .route("/pause-server", post(handlers::pause_server))
        .route("/resume-server", post(handlers::resume_server))
        .route("/", get(handlers::list_servers))
        .route("/status/{id}", get(handlers::server_status))
        .with_state(state);

    Router::new()
        .nest("/api/server", server_routes)
        .route("/health", get(handlers::health))
}
