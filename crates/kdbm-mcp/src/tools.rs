//! Tool registry.
//!
//! The set of tools is fixed: five database operations, always listed in the
//! same order. Input schemas describe the arguments for clients; the
//! arguments themselves are checked when a call is parsed (see
//! [`crate::arguments`]).

use serde_json::{Value, json};

use crate::protocol::ToolDescriptor;

/// The invocable tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ExecuteQuery,
    GetTables,
    GetTableStructure,
    GetTableRelations,
    GetDbDiagram,
}

impl ToolName {
    /// Registry order.
    pub const ALL: [ToolName; 5] = [
        ToolName::ExecuteQuery,
        ToolName::GetTables,
        ToolName::GetTableStructure,
        ToolName::GetTableRelations,
        ToolName::GetDbDiagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ExecuteQuery => "execute_query",
            ToolName::GetTables => "get_tables",
            ToolName::GetTableStructure => "get_table_structure",
            ToolName::GetTableRelations => "get_table_relations",
            ToolName::GetDbDiagram => "get_db_diagram",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }

    fn description(&self) -> &'static str {
        match self {
            ToolName::ExecuteQuery => {
                "Runs a SQL statement and returns its result. Supports SELECT, INSERT, UPDATE and DELETE.\n\n\
                 Arguments:\n\
                 - query (string, required): SQL text. Use ? for positional parameters, e.g. \
                 'SELECT * FROM users WHERE age > ?' or 'INSERT INTO users (name, email) VALUES (?, ?)'.\n\
                 - params (array, optional): values bound to the ? placeholders in order, e.g. [25] or \
                 ['John', 'john@example.com'].\n\n\
                 Result:\n\
                 - for queries: rows as [{column1: value1, column2: value2, ...}, ...]\n\
                 - for INSERT/UPDATE/DELETE: {\"affected_rows\": n}"
            }
            ToolName::GetTables => {
                "Lists the user tables in the database.\n\n\
                 Arguments: none.\n\n\
                 Result: table names as [\"table1\", \"table2\", ...]."
            }
            ToolName::GetTableStructure => {
                "Describes one table in detail.\n\n\
                 Arguments:\n\
                 - table (string, required): table name, e.g. 'users'.\n\n\
                 Result:\n\
                 - columns: [{\"column_name\": \"id\", \"data_type\": \"integer\", \"is_nullable\": \"NO\", \
                 \"column_default\": null, \"is_primary_key\": true}, ...] in declared order\n\
                 - relations: foreign keys from or to this table"
            }
            ToolName::GetTableRelations => {
                "Shows the foreign-key relations of one table, both outgoing and incoming.\n\n\
                 Arguments:\n\
                 - table (string, required): table name, e.g. 'orders'.\n\n\
                 Result: [{\"schema_name\", \"constraint_name\", \"source_table\", \"source_column\", \
                 \"target_schema\", \"target_table\", \"target_column\"}, ...]"
            }
            ToolName::GetDbDiagram => {
                "Builds a diagram of every table and the relations between them.\n\n\
                 Arguments: none.\n\n\
                 Result: {\"tables\": [...], \"relations\": [...]}"
            }
        }
    }

    fn input_schema(&self) -> Value {
        match self {
            ToolName::ExecuteQuery => json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "SQL statement"
                    },
                    "params": {
                        "type": "array",
                        "description": "Positional parameters (optional)"
                    }
                },
                "required": ["query"]
            }),
            ToolName::GetTableStructure | ToolName::GetTableRelations => json!({
                "type": "object",
                "properties": {
                    "table": {
                        "type": "string",
                        "description": "Table name"
                    }
                },
                "required": ["table"]
            }),
            ToolName::GetTables | ToolName::GetDbDiagram => json!({
                "type": "object",
                "properties": {}
            }),
        }
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.as_str().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry of available tools.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: Vec<ToolDescriptor>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create the registry with every tool.
    pub fn new() -> Self {
        Self {
            tools: ToolName::ALL.iter().map(ToolName::descriptor).collect(),
        }
    }

    /// All descriptors, in registry order.
    pub fn list(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Check if a tool exists.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_registry_order_is_fixed() {
        let registry = ToolRegistry::new();
        let names: Vec<_> = registry.list().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "execute_query",
                "get_tables",
                "get_table_structure",
                "get_table_relations",
                "get_db_diagram"
            ]
        );
        assert_eq!(registry.list(), ToolRegistry::new().list());
    }

    #[test]
    fn test_lookup() {
        let registry = ToolRegistry::new();
        assert!(registry.contains("get_tables"));
        assert!(!registry.contains("drop_database"));
        assert_eq!(ToolName::parse("get_db_diagram"), Some(ToolName::GetDbDiagram));
        assert_eq!(ToolName::parse("GET_TABLES"), None);
    }

    #[test]
    fn test_input_schemas_are_valid_json_schema() {
        for tool in ToolRegistry::new().list() {
            assert!(
                jsonschema::validator_for(&tool.input_schema).is_ok(),
                "invalid schema for {}",
                tool.name
            );
        }
    }

    #[test]
    fn test_input_schemas_require_arguments() {
        let registry = ToolRegistry::new();
        let schema = &registry.get("get_table_structure").unwrap().input_schema;
        let validator = jsonschema::validator_for(schema).unwrap();
        assert!(validator.is_valid(&json!({"table": "orders"})));
        assert!(!validator.is_valid(&json!({})));

        let schema = &registry.get("execute_query").unwrap().input_schema;
        let validator = jsonschema::validator_for(schema).unwrap();
        assert!(validator.is_valid(&json!({"query": "SELECT 1", "params": [1]})));
        assert!(!validator.is_valid(&json!({"query": "SELECT 1", "params": 1})));
    }
}
