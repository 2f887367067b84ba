//! PostgreSQL engine over a sqlx pool.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use kdbm_core::ConnectionPoolConfig;
use serde_json::Value;
use sqlx::Arguments;
use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgArguments, PgPool, PgPoolOptions, PgRow, PgTypeInfo};

use super::decode::decode_row;
use super::{SqlEngine, acquire_timeout, idle_timeout};
use crate::error::EngineError;
use crate::param::SqlParam;
use crate::row::Row;

fn args_add<T>(args: &mut PgArguments, index: usize, v: T) -> Result<(), EngineError>
where
    T: Send + Sync + 'static,
    for<'q> T: sqlx::Encode<'q, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    args.add(v).map_err(|e| EngineError::Bind {
        index,
        reason: e.to_string(),
    })
}

/// A NULL sent with OID 0; the server infers its type from the statement.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UntypedNull;

impl sqlx::Type<sqlx::Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

fn bind_params(params: &[SqlParam]) -> Result<PgArguments, EngineError> {
    let mut args = PgArguments::default();
    for (i, param) in params.iter().enumerate() {
        let index = i + 1;
        match param {
            SqlParam::Null => args_add(&mut args, index, UntypedNull)?,
            SqlParam::Bool(b) => args_add(&mut args, index, *b)?,
            SqlParam::Int(n) => args_add(&mut args, index, *n)?,
            SqlParam::Float(f) => args_add(&mut args, index, *f)?,
            SqlParam::Text(s) => args_add(&mut args, index, s.clone())?,
            SqlParam::Json(v) => args_add(&mut args, index, sqlx::types::Json(v.clone()))?,
        }
    }
    Ok(args)
}

fn pg_row_to_row(row: &PgRow) -> Row {
    decode_row!(row;
        bool,
        i16,
        i32,
        i64,
        f32,
        f64,
        BigDecimal,
        String,
        Value,
        uuid::Uuid,
        NaiveDate,
        NaiveTime,
        NaiveDateTime,
        DateTime<Utc>,
        Vec<u8>,
    )
}

/// PostgreSQL connection pool.
pub struct PgEngine {
    pool: PgPool,
}

impl PgEngine {
    pub async fn connect(url: &str, pool: &ConnectionPoolConfig) -> Result<Self, EngineError> {
        let pool = PgPoolOptions::new()
            .min_connections(pool.min_connections)
            .max_connections(pool.max_connections)
            .acquire_timeout(acquire_timeout(pool))
            .idle_timeout(idle_timeout(pool))
            .connect(url)
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SqlEngine for PgEngine {
    async fn product_name(&self) -> Result<String, EngineError> {
        let version: String = sqlx::query_scalar("SELECT version()")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    async fn fetch_rows(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, EngineError> {
        let args = bind_params(params)?;
        let rows = sqlx::query_with(sql, args).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(pg_row_to_row).collect())
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, EngineError> {
        let args = bind_params(params)?;
        let result = sqlx::query_with(sql, args).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Type;

    #[test]
    fn test_null_is_sent_without_a_type() {
        assert_eq!(UntypedNull::type_info().oid(), Some(Oid(0)));
        assert!(bind_params(&[SqlParam::Null, SqlParam::Int(4)]).is_ok());
    }
}
