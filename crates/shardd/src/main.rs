//! shardd — the Shardhost daemon.
//!
//! Single binary that assembles the control plane:
//! - Artifact store (redb)
//! - Cluster client (HTTP agent, or in-memory for local development)
//! - Lifecycle orchestrator
//! - REST API
//!
//! # Usage
//!
//! ```text
//! shardd serve --port 8000 --data-dir /var/lib/shardhost \
//!     --cluster-url https://agent.cluster.internal:7443
//! ```

mod settings;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use shard_core::ProfileTable;
use shardhost_cluster::{ClusterApi, HttpClusterClient, InMemoryCluster};
use shardhost_lifecycle::Orchestrator;
use shardhost_store::ArtifactStore;

use crate::settings::{Overrides, Settings};

#[derive(Parser)]
#[command(name = "shardd", about = "Shardhost daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control plane.
    Serve {
        /// Port to listen on.
        #[arg(long)]
        port: Option<u16>,

        /// Data directory for the artifact store.
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Cluster agent base URL. Omit to run against the in-memory
        /// cluster backend.
        #[arg(long)]
        cluster_url: Option<String>,

        /// Path to a profiles.toml override file.
        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Force the in-memory cluster backend even if a URL is configured.
        #[arg(long)]
        in_memory_cluster: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shardd=debug,shardhost=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            data_dir,
            cluster_url,
            profiles,
            in_memory_cluster,
        } => {
            let settings = Settings::resolve(Overrides {
                port,
                data_dir,
                cluster_url,
                profiles_path: profiles,
            })?;
            run_serve(settings, in_memory_cluster).await
        }
    }
}

async fn run_serve(settings: Settings, in_memory_cluster: bool) -> anyhow::Result<()> {
    info!(port = settings.port, "Shardhost daemon starting");

    // Ensure the data directory exists.
    std::fs::create_dir_all(&settings.data_dir)?;
    let db_path = settings.data_dir.join("artifacts.redb");

    // ── Initialize subsystems ──────────────────────────────────

    // Artifact store.
    let store = ArtifactStore::open(&db_path)?;
    info!(path = ?db_path, "artifact store opened");

    // Game profiles.
    let profiles = match &settings.profiles_path {
        Some(path) => {
            let table = ProfileTable::from_file(path)?;
            info!(?path, "profile overrides loaded");
            table
        }
        None => ProfileTable::builtin(),
    };

    // Cluster client.
    let cluster: Arc<dyn ClusterApi> = match (&settings.cluster_url, in_memory_cluster) {
        (Some(url), false) => {
            info!(%url, "using cluster agent");
            Arc::new(HttpClusterClient::new(url, settings.cluster_token.clone())?)
        }
        _ => {
            warn!("no cluster agent configured, using the in-memory backend");
            Arc::new(InMemoryCluster::new())
        }
    };

    // Lifecycle orchestrator.
    let orchestrator = Arc::new(Orchestrator::new(cluster, store, profiles));
    info!("orchestrator initialized");

    // ── Start API server ───────────────────────────────────────

    let router = shardhost_api::build_router(orchestrator);
    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

    info!(%addr, "API server starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Graceful shutdown on Ctrl-C.
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c()
                .await
                .expect("failed to install CTRL+C handler");
            info!("shutdown signal received");
        })
        .await?;

    info!("Shardhost daemon stopped");
    Ok(())
}
