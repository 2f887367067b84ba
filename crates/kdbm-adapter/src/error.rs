//! Error types for the adapter crate.

use crate::dialect::Dialect;
use thiserror::Error;

/// Errors reported by a SQL engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The statement reached the database and was rejected.
    #[error("{0}")]
    Database(String),

    /// No connection could be obtained.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The connection URL names a driver this build cannot open.
    #[error("unsupported database url scheme '{0}'")]
    UnsupportedScheme(String),

    /// A parameter could not be bound.
    #[error("cannot bind parameter {index}: {reason}")]
    Bind { index: usize, reason: String },
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => EngineError::Database(db.message().to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                EngineError::Connection(err.to_string())
            }
            sqlx::Error::Tls(_) | sqlx::Error::Configuration(_) => {
                EngineError::Connection(err.to_string())
            }
            other => EngineError::Database(other.to_string()),
        }
    }
}

/// Heuristic hints attached to query failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryHint {
    MissingTable,
    MissingColumn,
    NullValue,
}

impl QueryHint {
    pub fn text(&self) -> &'static str {
        match self {
            QueryHint::MissingTable => "The referenced table was not found.",
            QueryHint::MissingColumn => "The referenced column was not found.",
            QueryHint::NullValue => "A NULL value could not be handled.",
        }
    }

    /// Match a driver message against known failure wordings.
    ///
    /// `NullValue` is only reported for mutating statements.
    pub fn detect(message: &str, is_update: bool) -> Vec<QueryHint> {
        let lower = message.to_lowercase();
        let mut hints = Vec::new();

        let missing_table = (message.contains("Table") && message.contains("doesn't exist"))
            || (lower.contains("relation") && lower.contains("does not exist"))
            || lower.contains("table or view does not exist")
            || lower.contains("invalid object name");
        if missing_table {
            hints.push(QueryHint::MissingTable);
        }

        let missing_column = message.contains("Unknown column")
            || (lower.contains("column") && lower.contains("does not exist"))
            || lower.contains("invalid identifier")
            || lower.contains("invalid column name");
        if missing_column {
            hints.push(QueryHint::MissingColumn);
        }

        if is_update && message.contains("NULL") {
            hints.push(QueryHint::NullValue);
        }

        hints
    }
}

/// Errors returned by the database gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Introspection was attempted against a database whose product could
    /// not be classified.
    #[error("unsupported dialect: {0}")]
    UnsupportedDialect(Dialect),

    /// A read statement failed.
    #[error("query failed: {}", describe(message, hints))]
    QueryExecution {
        message: String,
        hints: Vec<QueryHint>,
    },

    /// A mutating statement failed.
    #[error("update failed: {}", describe(message, hints))]
    UpdateExecution {
        message: String,
        hints: Vec<QueryHint>,
    },

    /// The database could not be reached.
    #[error("{0}")]
    Connection(String),
}

impl GatewayError {
    pub(crate) fn query(err: EngineError) -> Self {
        match err {
            EngineError::Connection(msg) => GatewayError::Connection(msg),
            other => {
                let message = other.to_string();
                let hints = QueryHint::detect(&message, false);
                GatewayError::QueryExecution { message, hints }
            }
        }
    }

    pub(crate) fn update(err: EngineError) -> Self {
        match err {
            EngineError::Connection(msg) => GatewayError::Connection(msg),
            other => {
                let message = other.to_string();
                let hints = QueryHint::detect(&message, true);
                GatewayError::UpdateExecution { message, hints }
            }
        }
    }
}

fn describe(message: &str, hints: &[QueryHint]) -> String {
    if hints.is_empty() {
        return message.to_string();
    }
    let hint_text: Vec<&str> = hints.iter().map(QueryHint::text).collect();
    format!(
        "{} Check the SQL syntax and identifiers. Original error: {}",
        hint_text.join(" "),
        message
    )
}
