//! shellcache host entry point.
//!
//! Boots the worker and exposes it as an MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use shellcache_client::{FetchClient, FetchConfig, Worker};
use shellcache_core::{AppConfig, CacheDb};
use tracing_subscriber::EnvFilter;

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

    tracing::info!(
        version = %config.version,
        origin = %config.origin,
        db_path = %config.db_path.display(),
        "Starting shellcache on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from_app_config(&config))?);
    let worker = Arc::new(Worker::new(db, network, &config)?);

    let handler = handler::ShellcacheServer::new(worker.clone());
    let server = serve_server(handler, stdio()).await?;

    server.waiting().await?;

    worker.flush().await;

    Ok(())
}
