//! Configuration types for kdbm.
//!
//! Configuration is loaded from a single YAML file (`kdbm.yaml`) with two
//! sections: `upstream` for the database connection and `mcp` for the tool
//! server and its transport. Every field has a default, so an empty file is a
//! valid configuration.

pub mod mcp;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use mcp::{McpConfig, Transport};
pub use upstream::{ConnectionPoolConfig, Driver, UpstreamConfig};

/// Complete kdbm configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct KdbmConfig {
    /// Upstream database connection.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Tool server settings.
    #[serde(default)]
    pub mcp: McpConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl KdbmConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mcp.max_message_size == 0 {
            return Err(ConfigError::Config(
                "mcp.max_message_size must be greater than zero".to_string(),
            ));
        }
        if !self.mcp.path.starts_with('/') {
            return Err(ConfigError::Config(format!(
                "mcp.path must start with '/', got '{}'",
                self.mcp.path
            )));
        }
        let pool = &self.upstream.pool;
        if pool.max_connections == 0 || pool.max_connections < pool.min_connections {
            return Err(ConfigError::Config(format!(
                "upstream.pool.max_connections ({}) must be at least 1 and not below min_connections ({})",
                pool.max_connections, pool.min_connections
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = KdbmConfig::from_yaml("").unwrap();
        assert_eq!(config.mcp.port, 8080);
        assert_eq!(config.upstream.pool.max_connections, 10);
    }

    #[test]
    fn test_partial_yaml() {
        let yaml = r#"
upstream:
  database_url: mysql://root:pw@localhost:3306/shop
mcp:
  transport: stdio
  max_message_size: 65536
"#;
        let config = KdbmConfig::from_yaml(yaml).unwrap();
        assert!(config.mcp.is_stdio());
        assert_eq!(config.mcp.max_message_size, 65536);
        assert_eq!(
            config.upstream.connection_string(),
            "mysql://root:pw@localhost:3306/shop"
        );
    }

    #[test]
    fn test_rejects_bad_path() {
        let err = KdbmConfig::from_yaml("mcp:\n  path: mcp\n").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_rejects_inverted_pool_bounds() {
        let yaml = "upstream:\n  pool:\n    min_connections: 5\n    max_connections: 2\n";
        assert!(KdbmConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mcp:\n  port: 9100").unwrap();
        let config = KdbmConfig::from_file(file.path()).unwrap();
        assert_eq!(config.mcp.port, 9100);
    }
}
