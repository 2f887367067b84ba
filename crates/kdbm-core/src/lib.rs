//! Shared configuration for the kdbm workspace.

pub mod config;

pub use config::{
    ConfigError, ConnectionPoolConfig, Driver, KdbmConfig, McpConfig, Transport, UpstreamConfig,
};
