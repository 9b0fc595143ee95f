//! shellkeep server entry point.
//!
//! Boots the worker for the configured deployment and serves its lifecycle
//! as MCP tools on stdio. Logging goes to stderr to avoid interfering with
//! the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellkeep_client::{FetchClient, FetchConfig};
use shellkeep_core::{AppConfig, Deployment, Fetcher, SqliteStore, Worker, WorkerHost};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let origin = config.origin()?;
    let manifest_path = config.require_manifest_path()?;

    let (manifest, shell) = Deployment::from_file(manifest_path)
        .with_context(|| format!("loading deployment from {}", manifest_path.display()))?
        .into_parts()?;

    let store = SqliteStore::open(&config.db_path)
        .await
        .with_context(|| format!("opening cache database {}", config.db_path.display()))?;

    let network: Arc<dyn Fetcher> = Arc::new(FetchClient::new(FetchConfig {
        user_agent: config.user_agent.clone(),
        max_bytes: config.max_bytes,
        max_redirects: config.max_redirects,
    })?);

    tracing::info!(
        origin = %origin,
        resources = manifest.len(),
        shell = shell.len(),
        digest = %manifest.digest(),
        "Starting shellkeep server on stdio transport"
    );

    let host = Arc::new(WorkerHost::new());
    let worker = Worker::new(manifest, shell, origin, Arc::new(store), network.clone(), host.clone());

    let handler = handler::ShellkeepServer::new(worker, host, network);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
