//! Wire protocol types.
//!
//! Every frame in either direction is one [`Message`]: a JSON object with a
//! protocol version, a correlation id, a method name and free-form params.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::McpError;

/// Protocol version carried in the `jsonrpc` field.
pub const JSONRPC_VERSION: &str = "2.0";

/// Method names.
pub mod method {
    pub const CAPABILITIES: &str = "capabilities";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_LIST_RESPONSE: &str = "tools/list/response";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const TOOLS_CALL_RESPONSE: &str = "tools/call/response";
    pub const ERROR: &str = "error";
}

/// A protocol message. Unknown fields are ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    #[serde(default = "default_jsonrpc", alias = "protocolVersion")]
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn default_jsonrpc() -> String {
    JSONRPC_VERSION.to_string()
}

impl Message {
    pub fn new(id: Option<Value>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Unsolicited greeting sent when a connection opens.
    pub fn capabilities(connection_id: &str, version: &str) -> Self {
        Self::new(
            Some(Value::String(connection_id.to_string())),
            method::CAPABILITIES,
            json!({
                "version": version,
                "serverInfo": {
                    "name": "kdbm",
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    pub fn tools_list_response(id: Option<Value>, tools: &[ToolDescriptor]) -> Self {
        Self::new(id, method::TOOLS_LIST_RESPONSE, json!({ "tools": tools }))
    }

    pub fn tools_call_response(id: Option<Value>, result: &ToolResult) -> Self {
        Self::new(id, method::TOOLS_CALL_RESPONSE, json!({ "result": result }))
    }

    pub fn error(id: Option<Value>, message: impl Into<String>) -> Self {
        Self::new(id, method::ERROR, json!({ "message": message.into() }))
    }

    /// Encode as a single-line JSON text frame.
    pub fn encode(&self) -> Result<String, McpError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Decode a text frame.
///
/// On failure the error carries whatever `id` could still be read from the
/// frame, so the reply can be correlated.
pub fn decode(text: &str) -> Result<Message, McpError> {
    let value: Value = serde_json::from_str(text).map_err(|e| McpError::Decode {
        id: None,
        reason: e.to_string(),
    })?;

    let id = value.get("id").filter(|id| !id.is_null()).cloned();
    serde_json::from_value(value).map_err(|e| McpError::Decode {
        id,
        reason: e.to_string(),
    })
}

/// Description of one invocable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Outcome of a tool call: exactly one of `data` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolResult {
    Data(Value),
    Error(String),
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let msg = decode(
            r#"{"jsonrpc":"2.0","id":7,"method":"tools/list","params":{},"trace":"abc","extra":[1]}"#,
        )
        .unwrap();
        assert_eq!(msg.id, Some(json!(7)));
        assert_eq!(msg.method, "tools/list");
    }

    #[test]
    fn test_decode_defaults() {
        let msg = decode(r#"{"protocolVersion":"2.0","method":"tools/list"}"#).unwrap();
        assert_eq!(msg.jsonrpc, "2.0");
        assert_eq!(msg.id, None);
        assert_eq!(msg.params, Value::Null);
    }

    #[test]
    fn test_decode_failure_keeps_id() {
        let err = decode(r#"{"id":"abc","params":{}}"#).unwrap_err();
        assert!(matches!(err, McpError::Decode { id: Some(ref id), .. } if id == "abc"));

        let err = decode("not json").unwrap_err();
        assert!(matches!(err, McpError::Decode { id: None, .. }));
    }

    #[test]
    fn test_tool_result_shape() {
        let data = serde_json::to_value(ToolResult::Data(json!([1, 2]))).unwrap();
        assert_eq!(data, json!({"data": [1, 2]}));

        let error = serde_json::to_value(ToolResult::Error("boom".to_string())).unwrap();
        assert_eq!(error, json!({"error": "boom"}));
    }

    #[test]
    fn test_error_message_encoding() {
        let text = Message::error(Some(json!(3)), "unknown method: foo")
            .encode()
            .unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value,
            json!({
                "jsonrpc": "2.0",
                "id": 3,
                "method": "error",
                "params": {"message": "unknown method: foo"}
            })
        );
    }
}
