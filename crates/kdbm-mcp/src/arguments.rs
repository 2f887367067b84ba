//! Typed tool calls.
//!
//! `tools/call` params carry a tool name and its arguments. Arguments may sit
//! in a nested `args` (or `arguments`) object or directly beside the tool
//! name; the nested value wins when both are present.

use serde_json::Value;

use crate::error::{ArgumentError, McpError};
use crate::tools::ToolName;

/// A parsed, validated tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolCall {
    ExecuteQuery { query: String, params: Vec<Value> },
    GetTables,
    GetTableStructure { table: String },
    GetTableRelations { table: String },
    GetDbDiagram,
}

impl ToolCall {
    pub fn tool(&self) -> ToolName {
        match self {
            ToolCall::ExecuteQuery { .. } => ToolName::ExecuteQuery,
            ToolCall::GetTables => ToolName::GetTables,
            ToolCall::GetTableStructure { .. } => ToolName::GetTableStructure,
            ToolCall::GetTableRelations { .. } => ToolName::GetTableRelations,
            ToolCall::GetDbDiagram => ToolName::GetDbDiagram,
        }
    }

    /// Build the call for `tool` from `tools/call` params.
    pub fn from_params(tool: ToolName, params: &Value) -> Result<Self, ArgumentError> {
        let args = CallArguments::new(tool, params);
        match tool {
            ToolName::ExecuteQuery => Ok(ToolCall::ExecuteQuery {
                query: args.required_str("query")?,
                params: args.optional_array("params")?,
            }),
            ToolName::GetTables => Ok(ToolCall::GetTables),
            ToolName::GetTableStructure => Ok(ToolCall::GetTableStructure {
                table: args.required_str("table")?,
            }),
            ToolName::GetTableRelations => Ok(ToolCall::GetTableRelations {
                table: args.required_str("table")?,
            }),
            ToolName::GetDbDiagram => Ok(ToolCall::GetDbDiagram),
        }
    }
}

/// Tool name named by `tools/call` params: `toolName`, or `name`.
pub fn tool_name(params: &Value) -> Result<&str, McpError> {
    ["toolName", "name"]
        .iter()
        .find_map(|key| params.get(key).and_then(Value::as_str))
        .ok_or_else(|| McpError::InvalidRequest("tools/call requires 'toolName'".to_string()))
}

struct CallArguments<'a> {
    tool: ToolName,
    nested: Option<&'a Value>,
    top: &'a Value,
}

impl<'a> CallArguments<'a> {
    fn new(tool: ToolName, params: &'a Value) -> Self {
        let nested = ["args", "arguments"]
            .iter()
            .find_map(|key| params.get(key).filter(|v| v.is_object()));
        Self {
            tool,
            nested,
            top: params,
        }
    }

    /// Nested value first, then top level. Explicit nulls count as absent.
    fn get(&self, name: &str) -> Option<&'a Value> {
        self.nested
            .and_then(|args| args.get(name))
            .filter(|v| !v.is_null())
            .or_else(|| self.top.get(name).filter(|v| !v.is_null()))
    }

    fn required_str(&self, name: &'static str) -> Result<String, ArgumentError> {
        match self.get(name) {
            None => Err(self.missing(name)),
            Some(Value::String(s)) if s.trim().is_empty() => Err(self.missing(name)),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(_) => Err(ArgumentError::WrongType {
                tool: self.tool.as_str(),
                argument: name,
                expected: "a string",
            }),
        }
    }

    fn optional_array(&self, name: &'static str) -> Result<Vec<Value>, ArgumentError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(_) => Err(ArgumentError::WrongType {
                tool: self.tool.as_str(),
                argument: name,
                expected: "an array",
            }),
        }
    }

    fn missing(&self, name: &'static str) -> ArgumentError {
        ArgumentError::Missing {
            tool: self.tool.as_str(),
            argument: name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_nested_query_with_top_level_params() {
        let params = json!({
            "toolName": "execute_query",
            "args": {"query": "SELECT * FROM t WHERE id = ?"},
            "params": [5]
        });
        let call = ToolCall::from_params(ToolName::ExecuteQuery, &params).unwrap();
        assert_eq!(
            call,
            ToolCall::ExecuteQuery {
                query: "SELECT * FROM t WHERE id = ?".to_string(),
                params: vec![json!(5)],
            }
        );
    }

    #[test]
    fn test_nested_wins_over_top_level() {
        let params = json!({
            "toolName": "get_table_structure",
            "args": {"table": "orders"},
            "table": "customers"
        });
        let call = ToolCall::from_params(ToolName::GetTableStructure, &params).unwrap();
        assert_eq!(
            call,
            ToolCall::GetTableStructure {
                table: "orders".to_string()
            }
        );
    }

    #[test]
    fn test_flat_and_mcp_style_arguments() {
        let flat = json!({"toolName": "get_table_relations", "table": "orders"});
        assert_eq!(
            ToolCall::from_params(ToolName::GetTableRelations, &flat).unwrap(),
            ToolCall::GetTableRelations {
                table: "orders".to_string()
            }
        );

        let mcp = json!({"name": "get_table_relations", "arguments": {"table": "orders"}});
        assert_eq!(tool_name(&mcp).unwrap(), "get_table_relations");
        assert_eq!(
            ToolCall::from_params(ToolName::GetTableRelations, &mcp).unwrap(),
            ToolCall::GetTableRelations {
                table: "orders".to_string()
            }
        );
    }

    #[test]
    fn test_missing_required_argument() {
        let params = json!({"toolName": "get_table_structure", "args": {}});
        let err = ToolCall::from_params(ToolName::GetTableStructure, &params).unwrap_err();
        assert_eq!(
            err,
            ArgumentError::Missing {
                tool: "get_table_structure",
                argument: "table"
            }
        );
        assert_eq!(
            err.to_string(),
            "get_table_structure: missing required argument 'table'"
        );

        let blank = json!({"query": "   "});
        assert!(ToolCall::from_params(ToolName::ExecuteQuery, &blank).is_err());
    }

    #[test]
    fn test_wrong_types() {
        let params = json!({"query": "SELECT 1", "params": "oops"});
        let err = ToolCall::from_params(ToolName::ExecuteQuery, &params).unwrap_err();
        assert!(matches!(err, ArgumentError::WrongType { argument: "params", .. }));

        let params = json!({"table": 42});
        let err = ToolCall::from_params(ToolName::GetTableRelations, &params).unwrap_err();
        assert!(matches!(err, ArgumentError::WrongType { argument: "table", .. }));
    }

    #[test]
    fn test_tools_without_arguments_ignore_extras() {
        let params = json!({"toolName": "get_tables", "args": {"anything": 1}});
        assert_eq!(
            ToolCall::from_params(ToolName::GetTables, &params).unwrap(),
            ToolCall::GetTables
        );
    }

    #[test]
    fn test_tool_name_required() {
        let err = tool_name(&json!({"args": {}})).unwrap_err();
        assert!(matches!(err, McpError::InvalidRequest(_)));
    }
}
