//! Request dispatcher.
//!
//! [`McpServer`] routes decoded messages to the registry or the executor and
//! always produces exactly one reply. [`Session`] tracks one connection:
//! it greets the client, then handles frames one at a time until closed.

use std::sync::Arc;

use kdbm_adapter::DatabaseGateway;
use kdbm_core::{McpConfig, Transport};
use serde_json::Value;

use crate::arguments::{ToolCall, tool_name};
use crate::error::McpError;
use crate::executor::ToolExecutor;
use crate::protocol::{self, Message, ToolResult, method};
use crate::tools::{ToolName, ToolRegistry};

/// The tool protocol server.
pub struct McpServer {
    config: McpConfig,
    tools: ToolRegistry,
    executor: ToolExecutor,
}

impl McpServer {
    /// Create a new server over `gateway`.
    pub fn new(config: McpConfig, gateway: Arc<DatabaseGateway>) -> Self {
        Self {
            config,
            tools: ToolRegistry::new(),
            executor: ToolExecutor::new(gateway),
        }
    }

    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Start the server on the configured transport.
    pub async fn run(self: Arc<Self>) -> Result<(), McpError> {
        match self.config.transport {
            Transport::Websocket => crate::ws_transport::serve(self).await,
            Transport::Stdio => crate::stdio::run(self).await,
        }
    }

    /// The greeting for a new connection.
    pub fn capabilities(&self, connection_id: &str) -> Message {
        Message::capabilities(connection_id, &self.config.protocol_version)
    }

    /// Decode and handle one text frame.
    pub async fn handle_text(&self, text: &str, connection_id: &str) -> Message {
        match protocol::decode(text) {
            Ok(message) => self.handle_message(message, connection_id).await,
            Err(err) => {
                tracing::warn!(connection_id = %connection_id, error = %err, "undecodable message");
                let id = match &err {
                    McpError::Decode { id, .. } => id.clone(),
                    _ => None,
                };
                Message::error(id.or_else(|| connection_value(connection_id)), err.to_string())
            }
        }
    }

    /// Handle one decoded message.
    pub async fn handle_message(&self, message: Message, connection_id: &str) -> Message {
        tracing::debug!(
            connection_id = %connection_id,
            method = %message.method,
            id = ?message.id,
            "handling message"
        );

        let id = message.id.clone();
        let reply = match message.method.as_str() {
            method::TOOLS_LIST => Ok(Message::tools_list_response(id.clone(), self.tools.list())),
            method::TOOLS_CALL => self
                .handle_call_tool(&message.params)
                .await
                .map(|result| Message::tools_call_response(id.clone(), &result)),
            other => Err(McpError::UnknownMethod(other.to_string())),
        };

        reply.unwrap_or_else(|err| {
            tracing::warn!(connection_id = %connection_id, error = %err, "request failed");
            Message::error(id.or_else(|| connection_value(connection_id)), err.to_string())
        })
    }

    async fn handle_call_tool(&self, params: &Value) -> Result<ToolResult, McpError> {
        let name = tool_name(params)?;
        let tool = ToolName::parse(name)
            .filter(|t| self.tools.contains(t.as_str()))
            .ok_or_else(|| McpError::UnknownTool(name.to_string()))?;

        let call = match ToolCall::from_params(tool, params) {
            Ok(call) => call,
            Err(err) => return Ok(ToolResult::Error(err.to_string())),
        };

        Ok(self.executor.execute(&call).await)
    }
}

fn connection_value(connection_id: &str) -> Option<Value> {
    Some(Value::String(connection_id.to_string()))
}

/// Lifecycle of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Open, greeting not yet sent.
    Connected,
    /// Waiting for the next request.
    Idle,
    /// A request is being handled.
    AwaitingReply,
    Closed,
}

/// Per-connection state. Requests are handled strictly in arrival order.
#[derive(Debug)]
pub struct Session {
    id: String,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A new session with a fresh connection id.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: SessionState::Connected,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Produce the capabilities greeting. Only the first call returns one.
    pub fn open(&mut self, server: &McpServer) -> Option<Message> {
        if self.state != SessionState::Connected {
            return None;
        }
        tracing::info!(connection_id = %self.id, "connection opened");
        self.state = SessionState::Idle;
        Some(server.capabilities(&self.id))
    }

    /// Handle one inbound frame. `None` once the session is closed.
    pub async fn handle(&mut self, server: &McpServer, text: &str) -> Option<Message> {
        if self.state == SessionState::Closed {
            return None;
        }

        self.state = SessionState::AwaitingReply;
        let reply = server.handle_text(text, &self.id).await;
        self.state = SessionState::Idle;
        Some(reply)
    }

    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            tracing::info!(connection_id = %self.id, "connection closed");
            self.state = SessionState::Closed;
        }
    }
}
