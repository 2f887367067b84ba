//! Tool server configuration.
//!
//! This module defines configuration for the tool protocol server and
//! the transport it listens on.

use serde::{Deserialize, Serialize};

/// Configuration for the tool protocol server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Transport type: "websocket" or "stdio".
    #[serde(default)]
    pub transport: Transport,

    /// Bind host (only used for the WebSocket transport).
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port (only used for the WebSocket transport).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Route the WebSocket endpoint is mounted on.
    #[serde(default = "default_path")]
    pub path: String,

    /// Largest inbound message accepted, in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size: usize,

    /// Version advertised in the `capabilities` message.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
}

/// Transport type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Persistent WebSocket connections, one session per socket.
    #[default]
    Websocket,
    /// Standard input/output, a single session.
    Stdio,
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "websocket" | "ws" => Ok(Transport::Websocket),
            "stdio" => Ok(Transport::Stdio),
            other => Err(format!("unknown transport '{}'", other)),
        }
    }
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
            path: default_path(),
            max_message_size: default_max_message_size(),
            protocol_version: default_protocol_version(),
        }
    }
}

impl McpConfig {
    /// Socket address to bind for the WebSocket transport.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if using the WebSocket transport.
    pub fn is_websocket(&self) -> bool {
        self.transport == Transport::Websocket
    }

    /// Check if using stdio transport.
    pub fn is_stdio(&self) -> bool {
        self.transport == Transport::Stdio
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_path() -> String {
    "/mcp".to_string()
}

fn default_max_message_size() -> usize {
    8 * 1024
}

fn default_protocol_version() -> String {
    "1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = McpConfig::default();
        assert!(config.is_websocket());
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.path, "/mcp");
        assert_eq!(config.max_message_size, 8192);
    }

    #[test]
    fn test_transport_from_str() {
        assert_eq!("ws".parse::<Transport>(), Ok(Transport::Websocket));
        assert_eq!("STDIO".parse::<Transport>(), Ok(Transport::Stdio));
        assert!("http".parse::<Transport>().is_err());
    }
}
