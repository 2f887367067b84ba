//! System-catalog queries per dialect.
//!
//! Each supported dialect contributes one [`DialectCatalog`] row: a set of
//! functions producing the SQL text and positional parameters for the four
//! introspection operations. Adding a dialect means adding a row to
//! [`CATALOGS`]. Nothing here touches a connection.
//!
//! All relation queries project the same edge shape (see [`edge`]) so callers
//! never need to know which dialect produced a row.

use crate::dialect::Dialect;
use crate::param::SqlParam;

/// Column names shared by every relation query.
pub mod edge {
    pub const SCHEMA_NAME: &str = "schema_name";
    pub const CONSTRAINT_NAME: &str = "constraint_name";
    pub const SOURCE_TABLE: &str = "source_table";
    pub const SOURCE_COLUMN: &str = "source_column";
    pub const TARGET_SCHEMA: &str = "target_schema";
    pub const TARGET_TABLE: &str = "target_table";
    pub const TARGET_COLUMN: &str = "target_column";
}

/// Column names shared by every table-columns query.
pub mod column {
    pub const COLUMN_NAME: &str = "column_name";
    pub const DATA_TYPE: &str = "data_type";
    pub const IS_NULLABLE: &str = "is_nullable";
    pub const COLUMN_DEFAULT: &str = "column_default";
    pub const IS_PRIMARY_KEY: &str = "is_primary_key";
}

/// An introspection operation against the system catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Introspection<'a> {
    ListTables,
    TableColumns(&'a str),
    TableRelations(&'a str),
    AllRelations,
}

/// SQL text plus its positional parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogQuery {
    pub sql: &'static str,
    pub params: Vec<SqlParam>,
}

impl CatalogQuery {
    fn bare(sql: &'static str) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }

    fn with_table(sql: &'static str, table: &str, times: usize) -> Self {
        Self {
            sql,
            params: (0..times).map(|_| SqlParam::text(table)).collect(),
        }
    }
}

/// The catalog functions for one dialect.
pub struct DialectCatalog {
    pub dialect: Dialect,
    list_tables: fn() -> CatalogQuery,
    table_columns: fn(&str) -> CatalogQuery,
    table_relations: fn(&str) -> CatalogQuery,
    all_relations: fn() -> CatalogQuery,
}

static CATALOGS: [DialectCatalog; 4] = [
    DialectCatalog {
        dialect: Dialect::Postgres,
        list_tables: postgres::list_tables,
        table_columns: postgres::table_columns,
        table_relations: postgres::table_relations,
        all_relations: postgres::all_relations,
    },
    DialectCatalog {
        dialect: Dialect::Oracle,
        list_tables: oracle::list_tables,
        table_columns: oracle::table_columns,
        table_relations: oracle::table_relations,
        all_relations: oracle::all_relations,
    },
    DialectCatalog {
        dialect: Dialect::Mysql,
        list_tables: mysql::list_tables,
        table_columns: mysql::table_columns,
        table_relations: mysql::table_relations,
        all_relations: mysql::all_relations,
    },
    DialectCatalog {
        dialect: Dialect::SqlServer,
        list_tables: sqlserver::list_tables,
        table_columns: sqlserver::table_columns,
        table_relations: sqlserver::table_relations,
        all_relations: sqlserver::all_relations,
    },
];

impl DialectCatalog {
    /// Look up the catalog for a dialect. `None` for `Dialect::Unknown`.
    pub fn for_dialect(dialect: Dialect) -> Option<&'static DialectCatalog> {
        CATALOGS.iter().find(|c| c.dialect == dialect)
    }

    /// Build the query for an operation. Table names are folded the way the
    /// dialect stores unquoted identifiers.
    pub fn query(&self, op: Introspection<'_>) -> CatalogQuery {
        match op {
            Introspection::ListTables => (self.list_tables)(),
            Introspection::TableColumns(table) => {
                (self.table_columns)(&self.dialect.fold_identifier(table))
            }
            Introspection::TableRelations(table) => {
                (self.table_relations)(&self.dialect.fold_identifier(table))
            }
            Introspection::AllRelations => (self.all_relations)(),
        }
    }
}

/// Build the catalog query for `op`, or `None` when the dialect has no catalog.
pub fn catalog_query(dialect: Dialect, op: Introspection<'_>) -> Option<CatalogQuery> {
    DialectCatalog::for_dialect(dialect).map(|catalog| catalog.query(op))
}

mod postgres {
    use super::CatalogQuery;

    // information_schema columns are domain types; cast them so drivers see text.
    const LIST_TABLES: &str = "\
SELECT table_name::text AS table_name \
FROM information_schema.tables \
WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
ORDER BY table_name";

    const TABLE_COLUMNS: &str = "\
SELECT c.column_name::text AS column_name, \
c.data_type::text AS data_type, \
c.is_nullable::text AS is_nullable, \
c.column_default::text AS column_default, \
CASE WHEN pk.column_name IS NOT NULL THEN true ELSE false END AS is_primary_key \
FROM information_schema.columns c \
LEFT JOIN ( \
SELECT ku.table_name, ku.column_name \
FROM information_schema.table_constraints AS tc \
JOIN information_schema.key_column_usage AS ku \
ON tc.constraint_name = ku.constraint_name AND tc.table_schema = ku.table_schema \
WHERE tc.constraint_type = 'PRIMARY KEY' AND tc.table_schema = 'public' \
) pk ON c.table_name = pk.table_name AND c.column_name = pk.column_name \
WHERE c.table_name = $1 AND c.table_schema = 'public' \
ORDER BY c.ordinal_position";

    macro_rules! relations_select {
        () => {
            "\
SELECT tc.table_schema::text AS schema_name, \
tc.constraint_name::text AS constraint_name, \
tc.table_name::text AS source_table, \
kcu.column_name::text AS source_column, \
ccu.table_schema::text AS target_schema, \
ccu.table_name::text AS target_table, \
ccu.column_name::text AS target_column \
FROM information_schema.table_constraints AS tc \
JOIN information_schema.key_column_usage AS kcu \
ON tc.constraint_name = kcu.constraint_name AND tc.table_schema = kcu.table_schema \
JOIN information_schema.constraint_column_usage AS ccu \
ON ccu.constraint_name = tc.constraint_name AND ccu.constraint_schema = tc.constraint_schema \
WHERE tc.constraint_type = 'FOREIGN KEY'"
        };
    }

    const TABLE_RELATIONS: &str = concat!(
        relations_select!(),
        " AND (tc.table_name = $1 OR ccu.table_name = $2) ORDER BY tc.constraint_name, kcu.ordinal_position"
    );

    const ALL_RELATIONS: &str = concat!(
        relations_select!(),
        " ORDER BY tc.table_name, tc.constraint_name, kcu.ordinal_position"
    );

    pub(super) fn list_tables() -> CatalogQuery {
        CatalogQuery::bare(LIST_TABLES)
    }

    pub(super) fn table_columns(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_COLUMNS, table, 1)
    }

    pub(super) fn table_relations(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_RELATIONS, table, 2)
    }

    pub(super) fn all_relations() -> CatalogQuery {
        CatalogQuery::bare(ALL_RELATIONS)
    }
}

mod oracle {
    use super::CatalogQuery;

    const LIST_TABLES: &str = "SELECT table_name FROM user_tables ORDER BY table_name";

    const TABLE_COLUMNS: &str = "\
SELECT c.column_name, c.data_type, \
CASE WHEN c.nullable = 'Y' THEN 'YES' ELSE 'NO' END AS is_nullable, \
c.data_default AS column_default, \
CASE WHEN c.column_name IN ( \
SELECT ucc.column_name FROM user_cons_columns ucc \
JOIN user_constraints uc ON ucc.constraint_name = uc.constraint_name \
WHERE uc.constraint_type = 'P' AND ucc.table_name = :1 \
) THEN 'true' ELSE 'false' END AS is_primary_key \
FROM user_tab_columns c \
WHERE c.table_name = :2 \
ORDER BY c.column_id";

    macro_rules! relations_select {
        () => {
            "\
SELECT a.owner AS schema_name, \
a.constraint_name AS constraint_name, \
a.table_name AS source_table, \
b.column_name AS source_column, \
c.owner AS target_schema, \
c.table_name AS target_table, \
d.column_name AS target_column \
FROM user_constraints a \
JOIN user_cons_columns b ON a.constraint_name = b.constraint_name \
JOIN user_constraints c ON a.r_constraint_name = c.constraint_name \
JOIN user_cons_columns d ON c.constraint_name = d.constraint_name AND b.position = d.position \
WHERE a.constraint_type = 'R'"
        };
    }

    const TABLE_RELATIONS: &str = concat!(
        relations_select!(),
        " AND (a.table_name = :1 OR c.table_name = :2) ORDER BY a.constraint_name, b.position"
    );

    const ALL_RELATIONS: &str = concat!(
        relations_select!(),
        " ORDER BY a.table_name, a.constraint_name, b.position"
    );

    pub(super) fn list_tables() -> CatalogQuery {
        CatalogQuery::bare(LIST_TABLES)
    }

    pub(super) fn table_columns(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_COLUMNS, table, 2)
    }

    pub(super) fn table_relations(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_RELATIONS, table, 2)
    }

    pub(super) fn all_relations() -> CatalogQuery {
        CatalogQuery::bare(ALL_RELATIONS)
    }
}

mod mysql {
    use super::CatalogQuery;

    const LIST_TABLES: &str = "\
SELECT table_name AS table_name \
FROM information_schema.tables \
WHERE table_schema = DATABASE() AND table_type = 'BASE TABLE' \
ORDER BY table_name";

    const TABLE_COLUMNS: &str = "\
SELECT column_name AS column_name, \
data_type AS data_type, \
is_nullable AS is_nullable, \
column_default AS column_default, \
CASE WHEN column_key = 'PRI' THEN true ELSE false END AS is_primary_key \
FROM information_schema.columns \
WHERE table_name = ? AND table_schema = DATABASE() \
ORDER BY ordinal_position";

    macro_rules! relations_select {
        () => {
            "\
SELECT kcu.table_schema AS schema_name, \
kcu.constraint_name AS constraint_name, \
kcu.table_name AS source_table, \
kcu.column_name AS source_column, \
kcu.referenced_table_schema AS target_schema, \
kcu.referenced_table_name AS target_table, \
kcu.referenced_column_name AS target_column \
FROM information_schema.key_column_usage kcu \
WHERE kcu.referenced_table_name IS NOT NULL \
AND kcu.table_schema = DATABASE()"
        };
    }

    const TABLE_RELATIONS: &str = concat!(
        relations_select!(),
        " AND (kcu.table_name = ? OR kcu.referenced_table_name = ?) ORDER BY kcu.constraint_name, kcu.ordinal_position"
    );

    const ALL_RELATIONS: &str = concat!(
        relations_select!(),
        " ORDER BY kcu.table_name, kcu.constraint_name, kcu.ordinal_position"
    );

    pub(super) fn list_tables() -> CatalogQuery {
        CatalogQuery::bare(LIST_TABLES)
    }

    pub(super) fn table_columns(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_COLUMNS, table, 1)
    }

    pub(super) fn table_relations(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_RELATIONS, table, 2)
    }

    pub(super) fn all_relations() -> CatalogQuery {
        CatalogQuery::bare(ALL_RELATIONS)
    }
}

mod sqlserver {
    use super::CatalogQuery;

    const LIST_TABLES: &str = "\
SELECT table_name \
FROM information_schema.tables \
WHERE table_type = 'BASE TABLE' \
ORDER BY table_name";

    const TABLE_COLUMNS: &str = "\
SELECT c.name AS column_name, \
t.name AS data_type, \
CASE WHEN c.is_nullable = 1 THEN 'YES' ELSE 'NO' END AS is_nullable, \
OBJECT_DEFINITION(c.default_object_id) AS column_default, \
CASE WHEN pk.column_id IS NOT NULL THEN 1 ELSE 0 END AS is_primary_key \
FROM sys.columns c \
INNER JOIN sys.tables tb ON c.object_id = tb.object_id \
INNER JOIN sys.types t ON c.user_type_id = t.user_type_id \
LEFT JOIN ( \
SELECT ic.column_id, ic.object_id FROM sys.index_columns ic \
INNER JOIN sys.indexes i ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
WHERE i.is_primary_key = 1 \
) pk ON c.column_id = pk.column_id AND c.object_id = pk.object_id \
WHERE tb.name = @P1 \
ORDER BY c.column_id";

    macro_rules! relations_select {
        () => {
            "\
SELECT schema_name(fk.schema_id) AS schema_name, \
fk.name AS constraint_name, \
object_name(fk.parent_object_id) AS source_table, \
col1.name AS source_column, \
schema_name(pk.schema_id) AS target_schema, \
object_name(fk.referenced_object_id) AS target_table, \
col2.name AS target_column \
FROM sys.foreign_keys fk \
INNER JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id \
INNER JOIN sys.columns col1 ON col1.column_id = fkc.parent_column_id AND col1.object_id = fk.parent_object_id \
INNER JOIN sys.columns col2 ON col2.column_id = fkc.referenced_column_id AND col2.object_id = fk.referenced_object_id \
INNER JOIN sys.tables pk ON fk.referenced_object_id = pk.object_id"
        };
    }

    const TABLE_RELATIONS: &str = concat!(
        relations_select!(),
        " WHERE (object_name(fk.parent_object_id) = @P1 OR object_name(fk.referenced_object_id) = @P2) ORDER BY fk.name, fkc.constraint_column_id"
    );

    const ALL_RELATIONS: &str = concat!(
        relations_select!(),
        " ORDER BY object_name(fk.parent_object_id), fk.name, fkc.constraint_column_id"
    );

    pub(super) fn list_tables() -> CatalogQuery {
        CatalogQuery::bare(LIST_TABLES)
    }

    pub(super) fn table_columns(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_COLUMNS, table, 1)
    }

    pub(super) fn table_relations(table: &str) -> CatalogQuery {
        CatalogQuery::with_table(TABLE_RELATIONS, table, 2)
    }

    pub(super) fn all_relations() -> CatalogQuery {
        CatalogQuery::bare(ALL_RELATIONS)
    }
}
