//! Database dialect detection.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL dialect family of the connected database.
///
/// Resolved once per gateway from the product name the driver reports.
/// `Unknown` is terminal for every introspection operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Oracle,
    Mysql,
    SqlServer,
    Unknown,
}

impl Dialect {
    /// Classify a product name by case-insensitive substring match.
    pub fn from_product_name(product: &str) -> Self {
        let product = product.to_lowercase();
        if product.contains("postgresql") {
            Dialect::Postgres
        } else if product.contains("oracle") {
            Dialect::Oracle
        } else if product.contains("mysql") {
            Dialect::Mysql
        } else if product.contains("microsoft") || product.contains("sql server") {
            Dialect::SqlServer
        } else {
            Dialect::Unknown
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Dialect::Unknown)
    }

    /// Apply the dialect's identifier folding to a table name before it is
    /// matched against the system catalog.
    ///
    /// Postgres folds unquoted identifiers to lower case and Oracle to upper
    /// case; MySQL and SQL Server match the name as given.
    pub fn fold_identifier(&self, ident: &str) -> String {
        match self {
            Dialect::Postgres => ident.to_lowercase(),
            Dialect::Oracle => ident.to_uppercase(),
            Dialect::Mysql | Dialect::SqlServer | Dialect::Unknown => ident.to_string(),
        }
    }

    /// Parser dialect used to classify client statements.
    pub fn parser_dialect(&self) -> Box<dyn sqlparser::dialect::Dialect> {
        use sqlparser::dialect::{GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
        match self {
            Dialect::Postgres => Box::new(PostgreSqlDialect {}),
            Dialect::Mysql => Box::new(MySqlDialect {}),
            Dialect::SqlServer => Box::new(MsSqlDialect {}),
            Dialect::Oracle | Dialect::Unknown => Box::new(GenericDialect {}),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Postgres => "postgresql",
            Dialect::Oracle => "oracle",
            Dialect::Mysql => "mysql",
            Dialect::SqlServer => "sqlserver",
            Dialect::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_product_name() {
        assert_eq!(
            Dialect::from_product_name("PostgreSQL 16.2 on x86_64-pc-linux-musl"),
            Dialect::Postgres
        );
        assert_eq!(Dialect::from_product_name("Oracle"), Dialect::Oracle);
        assert_eq!(Dialect::from_product_name("MySQL 8.0.36"), Dialect::Mysql);
        assert_eq!(
            Dialect::from_product_name("Microsoft SQL Server"),
            Dialect::SqlServer
        );
        assert_eq!(Dialect::from_product_name("SQL Server 2022"), Dialect::SqlServer);
    }

    #[test]
    fn test_unrecognized_product_is_unknown() {
        assert_eq!(Dialect::from_product_name("SQLite"), Dialect::Unknown);
        assert_eq!(Dialect::from_product_name(""), Dialect::Unknown);
        assert!(!Dialect::Unknown.is_known());
    }

    #[test]
    fn test_fold_identifier() {
        assert_eq!(Dialect::Postgres.fold_identifier("Orders"), "orders");
        assert_eq!(Dialect::Oracle.fold_identifier("Orders"), "ORDERS");
        assert_eq!(Dialect::Mysql.fold_identifier("Orders"), "Orders");
        assert_eq!(Dialect::SqlServer.fold_identifier("Orders"), "Orders");
    }
}
