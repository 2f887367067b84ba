//! SQL execution engines.
//!
//! The gateway talks to the database only through [`SqlEngine`]. PostgreSQL
//! and MySQL/MariaDB ship as sqlx pools; other products plug in by
//! implementing the trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kdbm_core::ConnectionPoolConfig;

use crate::error::EngineError;
use crate::param::SqlParam;
use crate::row::Row;

mod decode;
pub mod mysql;
pub mod postgres;

pub use mysql::MySqlEngine;
pub use postgres::PgEngine;

/// A connection pool able to run parameterized SQL.
#[async_trait]
pub trait SqlEngine: Send + Sync {
    /// Product identifier reported by the server, e.g. `PostgreSQL 16.2 ...`.
    async fn product_name(&self) -> Result<String, EngineError>;

    /// Run a statement that returns rows.
    async fn fetch_rows(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, EngineError>;

    /// Run a statement and return the number of affected rows.
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, EngineError>;
}

/// Open a pool for `url`, picking the engine from the URL scheme.
pub async fn connect(
    url: &str,
    pool: &ConnectionPoolConfig,
) -> Result<Arc<dyn SqlEngine>, EngineError> {
    let scheme = url
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .unwrap_or_default();

    match scheme.as_str() {
        "postgres" | "postgresql" => Ok(Arc::new(PgEngine::connect(url, pool).await?)),
        "mysql" | "mariadb" => Ok(Arc::new(MySqlEngine::connect(url, pool).await?)),
        _ => Err(EngineError::UnsupportedScheme(scheme)),
    }
}

pub(crate) fn acquire_timeout(pool: &ConnectionPoolConfig) -> Duration {
    Duration::from_secs(u64::from(pool.acquire_timeout_seconds))
}

pub(crate) fn idle_timeout(pool: &ConnectionPoolConfig) -> Option<Duration> {
    match pool.idle_timeout_seconds {
        0 => None,
        secs => Some(Duration::from_secs(u64::from(secs))),
    }
}
