//! CLI command implementations.

pub mod check;
pub mod serve;
pub mod tools;

use anyhow::{Context, Result};
use kdbm_core::{KdbmConfig, Transport};
use std::path::Path;

/// Command-line values that take precedence over the configuration file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub database_url: Option<String>,
    pub transport: Option<Transport>,
    pub port: Option<u16>,
}

/// Load the configuration file (or defaults) and apply overrides.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<KdbmConfig> {
    let mut config = match path {
        Some(path) => KdbmConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => KdbmConfig::default(),
    };

    if let Some(url) = overrides.database_url {
        config.upstream.database_url = Some(url);
        config.upstream.database_url_env = None;
    }
    if let Some(transport) = overrides.transport {
        config.mcp.transport = transport;
    }
    if let Some(port) = overrides.port {
        config.mcp.port = port;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "upstream:\n  database_url: postgres://file/db\nmcp:\n  port: 9000\n"
        )
        .unwrap();

        let config = load_config(
            Some(file.path()),
            Overrides {
                database_url: Some("mysql://cli/db".to_string()),
                transport: Some(Transport::Stdio),
                port: None,
            },
        )
        .unwrap();

        assert_eq!(config.upstream.connection_string(), "mysql://cli/db");
        assert_eq!(config.mcp.transport, Transport::Stdio);
        assert_eq!(config.mcp.port, 9000);
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None, Overrides::default()).unwrap();
        assert_eq!(config.mcp.port, 8080);
        assert_eq!(config.mcp.path, "/mcp");
    }
}
