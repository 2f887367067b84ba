//! Positional statement parameters.

use serde_json::Value;

/// A positional parameter bound to a statement.
///
/// Client arguments arrive as loosely typed JSON; each value is mapped to the
/// closest SQL type once, before it reaches a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects are bound as JSON documents.
    Json(Value),
}

impl SqlParam {
    /// Map a JSON value onto a parameter.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlParam::Int(i),
                None => n.as_f64().map(SqlParam::Float).unwrap_or(SqlParam::Null),
            },
            Value::String(s) => SqlParam::Text(s.clone()),
            other => SqlParam::Json(other.clone()),
        }
    }

    /// Parameters for a mutating statement: empty strings are bound as NULL.
    pub fn for_update(value: &Value) -> Self {
        match value {
            Value::String(s) if s.is_empty() => SqlParam::Null,
            other => Self::from_json(other),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        SqlParam::Text(s.into())
    }
}

/// Convert a list of JSON arguments for a read statement.
pub fn query_params(values: &[Value]) -> Vec<SqlParam> {
    values.iter().map(SqlParam::from_json).collect()
}

/// Convert a list of JSON arguments for a mutating statement.
pub fn update_params(values: &[Value]) -> Vec<SqlParam> {
    values.iter().map(SqlParam::for_update).collect()
}
