//! `kdbm check`: verify the database is reachable and supported.

use anyhow::{Context, Result, bail};
use kdbm_adapter::DatabaseGateway;
use std::path::PathBuf;
use std::sync::Arc;

use super::{Overrides, load_config};

pub async fn run(config_path: Option<PathBuf>, overrides: Overrides) -> Result<()> {
    let config = load_config(config_path.as_deref(), overrides)?;

    let engine = kdbm_adapter::connect(&config.upstream.connection_string(), &config.upstream.pool)
        .await
        .context("Failed to connect to the database")?;
    let product = engine
        .product_name()
        .await
        .context("Failed to read the database product name")?;

    let gateway = DatabaseGateway::new(Arc::clone(&engine));
    let dialect = gateway.resolve_dialect().await;
    println!("Product: {}", product);
    println!("Dialect: {}", dialect);

    if !dialect.is_known() {
        bail!("Unsupported database product '{}'", product);
    }

    let tables = gateway
        .list_tables()
        .await
        .context("Failed to list tables")?;
    println!("Tables:  {}", tables.len());
    Ok(())
}
