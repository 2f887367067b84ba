//! Database access for kdbm.
//!
//! - [`dialect`]: product-name classification and identifier folding
//! - [`catalog`]: per-dialect system-catalog SQL
//! - [`engine`]: the [`SqlEngine`] trait and its sqlx implementations
//! - [`gateway`]: [`DatabaseGateway`], the single entry point used by tools

pub mod catalog;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod param;
pub mod placeholder;
pub mod row;
pub mod statement;

pub use dialect::Dialect;
pub use engine::{SqlEngine, connect};
pub use error::{EngineError, GatewayError, QueryHint};
pub use gateway::{DatabaseGateway, Diagram, StatementOutcome, TableStructure};
pub use param::SqlParam;
pub use row::Row;
