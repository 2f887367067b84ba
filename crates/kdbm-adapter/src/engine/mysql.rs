//! MySQL and MariaDB engine over a sqlx pool.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use kdbm_core::ConnectionPoolConfig;
use serde_json::Value;
use sqlx::Arguments;
use sqlx::mysql::{MySqlArguments, MySqlPool, MySqlPoolOptions, MySqlRow};

use super::decode::decode_row;
use super::{SqlEngine, acquire_timeout, idle_timeout};
use crate::error::EngineError;
use crate::param::SqlParam;
use crate::row::Row;

fn args_add<T>(args: &mut MySqlArguments, index: usize, v: T) -> Result<(), EngineError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    args.add(v).map_err(|e| EngineError::Bind {
        index,
        reason: e.to_string(),
    })
}

fn bind_params(params: &[SqlParam]) -> Result<MySqlArguments, EngineError> {
    let mut args = MySqlArguments::default();
    for (i, param) in params.iter().enumerate() {
        let index = i + 1;
        match param {
            SqlParam::Null => args_add(&mut args, index, Option::<String>::None)?,
            SqlParam::Bool(b) => args_add(&mut args, index, *b)?,
            SqlParam::Int(n) => args_add(&mut args, index, *n)?,
            SqlParam::Float(f) => args_add(&mut args, index, *f)?,
            SqlParam::Text(s) => args_add(&mut args, index, s.clone())?,
            SqlParam::Json(v) => args_add(&mut args, index, sqlx::types::Json(v.clone()))?,
        }
    }
    Ok(args)
}

// Integers come before bool: MySQL has no boolean column type and reports
// BOOLEAN columns as TINYINT(1).
fn mysql_row_to_row(row: &MySqlRow) -> Row {
    decode_row!(row;
        i8,
        i16,
        i32,
        i64,
        u8,
        u16,
        u32,
        u64,
        bool,
        f32,
        f64,
        BigDecimal,
        String,
        Value,
        NaiveDate,
        NaiveTime,
        NaiveDateTime,
        DateTime<Utc>,
        Vec<u8>,
    )
}

/// MySQL or MariaDB connection pool.
pub struct MySqlEngine {
    pool: MySqlPool,
}

impl MySqlEngine {
    pub async fn connect(url: &str, pool: &ConnectionPoolConfig) -> Result<Self, EngineError> {
        // sqlx only knows the mysql scheme; MariaDB speaks the same protocol.
        let url = match url.strip_prefix("mariadb://") {
            Some(rest) => format!("mysql://{rest}"),
            None => url.to_string(),
        };
        let pool = MySqlPoolOptions::new()
            .min_connections(pool.min_connections)
            .max_connections(pool.max_connections)
            .acquire_timeout(acquire_timeout(pool))
            .idle_timeout(idle_timeout(pool))
            .connect(&url)
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SqlEngine for MySqlEngine {
    // `version()` alone reports a bare number such as `8.0.36`.
    async fn product_name(&self) -> Result<String, EngineError> {
        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&self.pool)
            .await?;
        Ok(format!("MySQL {version}"))
    }

    async fn fetch_rows(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, EngineError> {
        let args = bind_params(params)?;
        let rows = sqlx::query_with(sql, args).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(mysql_row_to_row).collect())
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, EngineError> {
        let args = bind_params(params)?;
        let result = sqlx::query_with(sql, args).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
