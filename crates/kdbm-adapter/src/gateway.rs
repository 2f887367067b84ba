//! Database gateway.
//!
//! Executes client statements and catalog introspection against one
//! [`SqlEngine`], resolving the dialect on first use and normalizing the rows
//! every dialect returns into one shape.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::catalog::{self, CatalogQuery, Introspection, column, edge};
use crate::dialect::Dialect;
use crate::engine::SqlEngine;
use crate::error::GatewayError;
use crate::param::{query_params, update_params};
use crate::placeholder::question_to_dollar;
use crate::row::{Row, coerce_flag, first_column_string, lowercase_keys};
use crate::statement::{StatementKind, classify};

/// Result of a client statement routed through [`DatabaseGateway::execute_statement`].
#[derive(Debug, Clone, PartialEq)]
pub enum StatementOutcome {
    Rows(Vec<Row>),
    Affected(u64),
}

/// Columns and relations of one table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableStructure {
    pub columns: Vec<Row>,
    pub relations: Vec<Row>,
}

/// Every table plus every relation between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagram {
    pub tables: Vec<String>,
    pub relations: Vec<Row>,
}

/// Gateway to one database.
///
/// The dialect is resolved once and cached for the gateway's lifetime. No
/// connection is held between calls.
pub struct DatabaseGateway {
    engine: Arc<dyn SqlEngine>,
    dialect: OnceCell<Dialect>,
}

impl DatabaseGateway {
    pub fn new(engine: Arc<dyn SqlEngine>) -> Self {
        Self {
            engine,
            dialect: OnceCell::new(),
        }
    }

    /// Dialect of the connected database.
    ///
    /// A failed product inspection yields `Unknown` and is retried on the
    /// next call; a successful one is cached, even when unrecognized.
    pub async fn resolve_dialect(&self) -> Dialect {
        let resolved = self
            .dialect
            .get_or_try_init(|| async {
                let product = self.engine.product_name().await?;
                let dialect = Dialect::from_product_name(&product);
                tracing::info!(product = %product, dialect = %dialect, "resolved database dialect");
                Ok::<_, crate::error::EngineError>(dialect)
            })
            .await;

        match resolved {
            Ok(dialect) => *dialect,
            Err(e) => {
                tracing::warn!(error = %e, "could not inspect database product");
                Dialect::Unknown
            }
        }
    }

    /// Run a statement that returns rows. `?` placeholders are accepted on
    /// every dialect.
    pub async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, GatewayError> {
        let sql = self.native_sql(sql, params.len()).await;
        tracing::debug!(sql = %sql, params = params.len(), "executing query");
        self.engine
            .fetch_rows(&sql, &query_params(params))
            .await
            .map_err(GatewayError::query)
    }

    /// Run a mutating statement and return the affected row count. Empty
    /// string parameters are bound as NULL.
    pub async fn execute_update(&self, sql: &str, params: &[Value]) -> Result<u64, GatewayError> {
        let sql = self.native_sql(sql, params.len()).await;
        tracing::debug!(sql = %sql, params = params.len(), "executing update");
        self.engine
            .execute(&sql, &update_params(params))
            .await
            .map_err(GatewayError::update)
    }

    /// Route a client statement to [`execute_query`](Self::execute_query) or
    /// [`execute_update`](Self::execute_update) by what it does.
    pub async fn execute_statement(
        &self,
        sql: &str,
        params: &[Value],
    ) -> Result<StatementOutcome, GatewayError> {
        let dialect = self.resolve_dialect().await;
        match classify(dialect, sql) {
            StatementKind::Read => self.execute_query(sql, params).await.map(StatementOutcome::Rows),
            StatementKind::Write => self
                .execute_update(sql, params)
                .await
                .map(StatementOutcome::Affected),
        }
    }

    /// Names of the user tables.
    pub async fn list_tables(&self) -> Result<Vec<String>, GatewayError> {
        let rows = self.introspect(Introspection::ListTables).await?;
        Ok(rows.iter().filter_map(first_column_string).collect())
    }

    /// Column metadata for `table`, in declared order.
    pub async fn table_columns(&self, table: &str) -> Result<Vec<Row>, GatewayError> {
        self.introspect(Introspection::TableColumns(table)).await
    }

    /// Foreign keys where `table` is either the referencing or the referenced side.
    pub async fn table_relations(&self, table: &str) -> Result<Vec<Row>, GatewayError> {
        self.introspect(Introspection::TableRelations(table)).await
    }

    /// Every foreign key in the schema.
    pub async fn all_relations(&self) -> Result<Vec<Row>, GatewayError> {
        self.introspect(Introspection::AllRelations).await
    }

    pub async fn table_structure(&self, table: &str) -> Result<TableStructure, GatewayError> {
        let columns = self.table_columns(table).await?;
        let relations = self.table_relations(table).await?;
        Ok(TableStructure { columns, relations })
    }

    /// Tables and relations, with relations touching an unlisted table dropped.
    pub async fn diagram(&self) -> Result<Diagram, GatewayError> {
        let tables = self.list_tables().await?;
        let relations = self.all_relations().await?;
        let relations = drop_orphan_relations(&tables, relations);
        Ok(Diagram { tables, relations })
    }

    async fn introspect(&self, op: Introspection<'_>) -> Result<Vec<Row>, GatewayError> {
        let dialect = self.resolve_dialect().await;
        let CatalogQuery { sql, params } =
            catalog::catalog_query(dialect, op).ok_or(GatewayError::UnsupportedDialect(dialect))?;

        tracing::debug!(dialect = %dialect, op = ?op, params = params.len(), "running catalog query");
        let rows = self
            .engine
            .fetch_rows(sql, &params)
            .await
            .map_err(GatewayError::query)?;
        Ok(rows.into_iter().map(normalize_catalog_row).collect())
    }

    async fn native_sql(&self, sql: &str, param_count: usize) -> String {
        if param_count > 0 && self.resolve_dialect().await == Dialect::Postgres {
            question_to_dollar(sql)
        } else {
            sql.to_string()
        }
    }
}

fn normalize_catalog_row(row: Row) -> Row {
    let mut row = lowercase_keys(row);
    if let Some(flag) = row.get_mut(column::IS_PRIMARY_KEY) {
        *flag = coerce_flag(flag);
    }
    row
}

fn drop_orphan_relations(tables: &[String], relations: Vec<Row>) -> Vec<Row> {
    let known: HashSet<String> = tables.iter().map(|t| t.to_lowercase()).collect();
    let is_known = |row: &Row, key: &str| {
        row.get(key)
            .and_then(Value::as_str)
            .is_some_and(|t| known.contains(&t.to_lowercase()))
    };

    relations
        .into_iter()
        .filter(|row| is_known(row, edge::SOURCE_TABLE) && is_known(row, edge::TARGET_TABLE))
        .collect()
}
