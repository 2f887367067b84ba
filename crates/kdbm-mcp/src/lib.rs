//! # kdbm-mcp
//!
//! Tool protocol server exposing a relational database to remote clients.
//!
//! Clients connect over a persistent socket, list the available tools and
//! call them by name:
//!
//! ```text
//! client ──frame──▶ Session ──▶ McpServer ──▶ ToolRegistry   (tools/list)
//!                                    │
//!                                    └──▶ ToolCall ──▶ ToolExecutor ──▶ DatabaseGateway
//! ```
//!
//! | Tool | Arguments | Result |
//! |------|-----------|--------|
//! | `execute_query` | `query`, `params?` | rows, or `{affected_rows}` |
//! | `get_tables` | | table names |
//! | `get_table_structure` | `table` | `{columns, relations}` |
//! | `get_table_relations` | `table` | relation rows |
//! | `get_db_diagram` | | `{tables, relations}` |

pub mod arguments;
pub mod error;
pub mod executor;
pub mod protocol;
pub mod server;
pub mod stdio;
pub mod tools;
pub mod ws_transport;

pub use arguments::ToolCall;
pub use error::{ArgumentError, McpError};
pub use executor::ToolExecutor;
pub use protocol::{Message, ToolDescriptor, ToolResult};
pub use server::{McpServer, Session, SessionState};
pub use tools::{ToolName, ToolRegistry};
