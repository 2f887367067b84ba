//! Tool execution.
//!
//! Runs a parsed [`ToolCall`] against the database gateway and folds the
//! outcome into a [`ToolResult`]. Failures never escape as errors: they are
//! reported in the result, prefixed with the operation that failed.

use std::sync::Arc;

use kdbm_adapter::{DatabaseGateway, GatewayError, StatementOutcome};
use serde::Serialize;
use serde_json::{Value, json};

use crate::arguments::ToolCall;
use crate::protocol::ToolResult;

/// Executes tool calls against one database.
#[derive(Clone)]
pub struct ToolExecutor {
    gateway: Arc<DatabaseGateway>,
}

impl ToolExecutor {
    pub fn new(gateway: Arc<DatabaseGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<DatabaseGateway> {
        &self.gateway
    }

    /// Execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let tool = call.tool();
        let outcome = match call {
            ToolCall::ExecuteQuery { query, params } => self
                .gateway
                .execute_statement(query, params)
                .await
                .map(|outcome| match outcome {
                    StatementOutcome::Rows(rows) => to_value(rows),
                    StatementOutcome::Affected(n) => json!({ "affected_rows": n }),
                })
                .map_err(|e| failure("failed to execute query", e)),
            ToolCall::GetTables => self
                .gateway
                .list_tables()
                .await
                .map(to_value)
                .map_err(|e| failure("failed to list tables", e)),
            ToolCall::GetTableStructure { table } => self
                .gateway
                .table_structure(table)
                .await
                .map(to_value)
                .map_err(|e| failure("failed to read table structure", e)),
            ToolCall::GetTableRelations { table } => self
                .gateway
                .table_relations(table)
                .await
                .map(to_value)
                .map_err(|e| failure("failed to read table relations", e)),
            ToolCall::GetDbDiagram => self
                .gateway
                .diagram()
                .await
                .map(to_value)
                .map_err(|e| failure("failed to build database diagram", e)),
        };

        match outcome {
            Ok(data) => ToolResult::Data(data),
            Err(message) => {
                tracing::warn!(tool = %tool, error = %message, "tool call failed");
                ToolResult::Error(message)
            }
        }
    }
}

fn failure(operation: &str, err: GatewayError) -> String {
    format!("{}: {}", operation, err)
}

fn to_value<T: Serialize>(data: T) -> Value {
    serde_json::to_value(data).unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to serialize tool result");
        Value::Null
    })
}
