//! Normalized result rows.

use indexmap::IndexMap;
use serde_json::Value;

/// One result row: column name to value, in projection order.
pub type Row = IndexMap<String, Value>;

/// Lower-case every key so catalog rows look the same whichever dialect
/// produced them (Oracle and MySQL report upper-case labels).
pub fn lowercase_keys(row: Row) -> Row {
    row.into_iter()
        .map(|(k, v)| (k.to_lowercase(), v))
        .collect()
}

/// Coerce a driver-reported flag (`true`, `1`, `'true'`, `'YES'`) into a JSON
/// boolean. NULL stays NULL.
pub fn coerce_flag(value: &Value) -> Value {
    match value {
        Value::Bool(_) | Value::Null => value.clone(),
        Value::Number(n) => Value::Bool(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Value::Bool(matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "t" | "1" | "y" | "yes"
        )),
        other => other.clone(),
    }
}

/// Value of the first projected column as a string.
pub fn first_column_string(row: &Row) -> Option<String> {
    match row.values().next()? {
        Value::String(s) => Some(s.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lowercase_keys_preserves_order() {
        let mut row = Row::new();
        row.insert("COLUMN_NAME".to_string(), json!("id"));
        row.insert("DATA_TYPE".to_string(), json!("NUMBER"));
        row.insert("Is_Nullable".to_string(), json!("NO"));

        let row = lowercase_keys(row);
        let keys: Vec<_> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["column_name", "data_type", "is_nullable"]);
    }

    #[test]
    fn test_coerce_flag() {
        assert_eq!(coerce_flag(&json!(true)), json!(true));
        assert_eq!(coerce_flag(&json!(1)), json!(true));
        assert_eq!(coerce_flag(&json!(0)), json!(false));
        assert_eq!(coerce_flag(&json!("true")), json!(true));
        assert_eq!(coerce_flag(&json!("false")), json!(false));
        assert_eq!(coerce_flag(&json!(null)), json!(null));
    }

    #[test]
    fn test_first_column_string() {
        let mut row = Row::new();
        row.insert("TABLE_NAME".to_string(), json!("orders"));
        row.insert("other".to_string(), json!(1));
        assert_eq!(first_column_string(&row), Some("orders".to_string()));
        assert_eq!(first_column_string(&Row::new()), None);
    }
}
