//! `kdbm serve`: connect to the database and start the tool server.

use anyhow::{Context, Result};
use kdbm_adapter::DatabaseGateway;
use kdbm_mcp::McpServer;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Overrides, load_config};

pub async fn run(config_path: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = load_config(config_path.as_deref(), overrides)?;

    let url = config.upstream.connection_string();
    let engine = kdbm_adapter::connect(&url, &config.upstream.pool)
        .await
        .context("Failed to connect to the database")?;
    let gateway = Arc::new(DatabaseGateway::new(engine));

    let dialect = gateway.resolve_dialect().await;
    tracing::info!(
        dialect = %dialect,
        transport = ?config.mcp.transport,
        env_credentials = config.upstream.uses_env_credentials(),
        "database ready"
    );

    let server = Arc::new(McpServer::new(config.mcp.clone(), gateway));
    server.run().await.context("Server stopped with an error")?;
    Ok(())
}
