//! `kdbm tools`: print the tool descriptors.

use anyhow::Result;
use kdbm_mcp::ToolRegistry;

pub fn run() -> Result<()> {
    let registry = ToolRegistry::new();
    println!("{}", serde_json::to_string_pretty(registry.list())?);
    Ok(())
}
