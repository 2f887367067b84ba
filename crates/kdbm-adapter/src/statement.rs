//! Statement classification for `execute_query`.

use sqlparser::ast::{SelectItem, Statement};
use sqlparser::parser::Parser;

use crate::dialect::Dialect;

/// Whether a client statement returns rows or mutates state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

/// Leading keywords of statements that change data or schema.
const WRITE_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "merge", "replace", "upsert", "create", "alter", "drop",
    "truncate", "rename", "grant", "revoke", "comment", "call", "exec", "execute",
];

/// Classify `sql` using the parser for `dialect`.
///
/// A batch is a read only when every statement in it is. Text the parser
/// rejects is classified by its leading keyword; anything not recognizably a
/// write runs as a query, so malformed SQL surfaces as a query error.
pub fn classify(dialect: Dialect, sql: &str) -> StatementKind {
    let parser_dialect = dialect.parser_dialect();
    match Parser::parse_sql(parser_dialect.as_ref(), sql) {
        Ok(statements) if !statements.is_empty() => {
            if statements.iter().all(is_read) {
                StatementKind::Read
            } else {
                StatementKind::Write
            }
        }
        Ok(_) | Err(_) => classify_by_keyword(sql),
    }
}

fn is_read(stmt: &Statement) -> bool {
    match stmt {
        Statement::Insert(insert) => returns_rows(insert.returning.as_deref()),
        Statement::Update(update) => returns_rows(update.returning.as_deref()),
        Statement::Delete(delete) => returns_rows(delete.returning.as_deref()),
        _ => matches!(
            stmt,
            Statement::Query(_)
                | Statement::Explain { .. }
                | Statement::ExplainTable { .. }
                | Statement::ShowTables { .. }
                | Statement::ShowColumns { .. }
                | Statement::ShowVariable { .. }
                | Statement::ShowCreate { .. }
                | Statement::Pragma { .. }
        ),
    }
}

/// DML with a `RETURNING` clause yields rows and runs as a query.
fn returns_rows(returning: Option<&[SelectItem]>) -> bool {
    returning.is_some_and(|items| !items.is_empty())
}

fn classify_by_keyword(sql: &str) -> StatementKind {
    let keyword = leading_keyword(sql).to_ascii_lowercase();
    if WRITE_KEYWORDS.contains(&keyword.as_str()) {
        StatementKind::Write
    } else {
        StatementKind::Read
    }
}

/// First word of `sql`, skipping whitespace, comments and opening parens.
fn leading_keyword(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            break;
        }
    }
    let end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    &rest[..end]
}
