//! Error types for the tool protocol crate.

use serde_json::Value;
use thiserror::Error;

/// Errors that can occur in the tool protocol server.
///
/// Everything except `StartupFailed` and `Io` is answered on the wire with an
/// `error` message and leaves the connection open.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start server: {0}")]
    StartupFailed(String),

    /// A frame could not be decoded. `id` is the correlation id, if one could
    /// be read.
    #[error("invalid message: {reason}")]
    Decode { id: Option<Value>, reason: String },

    /// The request was well-formed but incomplete.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A tool was called with arguments that do not satisfy its contract.
///
/// Reported inside the tool result, not as a protocol error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    #[error("{tool}: missing required argument '{argument}'")]
    Missing {
        tool: &'static str,
        argument: &'static str,
    },

    #[error("{tool}: argument '{argument}' must be {expected}")]
    WrongType {
        tool: &'static str,
        argument: &'static str,
        expected: &'static str,
    },
}
