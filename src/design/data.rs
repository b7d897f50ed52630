//! Rows and column mappings.
//!
//! A row is one record of the data source (column name to cell text). Data
//! sources hand over JSON, where cells may be numbers, booleans or null; they
//! are stringified on the way in so the rest of the engine only sees text.

use std::collections::BTreeMap;

use serde_json::Value;

use super::de::value_to_string;
use crate::error::EtiquetaError;

/// One data record: column name to cell text.
pub type Row = BTreeMap<String, String>;

/// Element id to column name.
pub type ColumnMapping = BTreeMap<String, String>;

/// Parse rows from a JSON array of objects (a single object is one row).
pub fn rows_from_json(json: &str) -> Result<Vec<Row>, EtiquetaError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Array(items) => items.iter().map(row_from_value).collect(),
        Value::Object(_) => Ok(vec![row_from_value(&value)?]),
        Value::Null => Ok(Vec::new()),
        other => Err(EtiquetaError::InvalidInput(format!(
            "rows must be an array of objects, got {}",
            type_name(&other)
        ))),
    }
}

fn row_from_value(value: &Value) -> Result<Row, EtiquetaError> {
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .collect()),
        other => Err(EtiquetaError::InvalidInput(format!(
            "each row must be an object, got {}",
            type_name(other)
        ))),
    }
}

/// Parse an element-id to column mapping from a JSON object.
pub fn mapping_from_json(json: &str) -> Result<ColumnMapping, EtiquetaError> {
    let value: Value = serde_json::from_str(json)?;
    match value {
        Value::Object(map) => Ok(map
            .iter()
            .map(|(k, v)| (k.clone(), value_to_string(v)))
            .filter(|(_, column)| !column.is_empty())
            .collect()),
        Value::Null => Ok(ColumnMapping::new()),
        other => Err(EtiquetaError::InvalidInput(format!(
            "column mapping must be an object, got {}",
            type_name(&other)
        ))),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_stringified() {
        let rows = rows_from_json(r#"[{"sku": 1001, "price": 9.5, "ok": true, "note": null}]"#)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["sku"], "1001");
        assert_eq!(rows[0]["price"], "9.5");
        assert_eq!(rows[0]["ok"], "true");
        assert_eq!(rows[0]["note"], "");
    }

    #[test]
    fn test_single_object_is_one_row() {
        let rows = rows_from_json(r#"{"a": "x"}"#).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_rows_reject_scalars() {
        assert!(rows_from_json("42").is_err());
        assert!(rows_from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_mapping_drops_empty_columns() {
        let mapping = mapping_from_json(r#"{"t1": "nombre", "t2": ""}"#).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping["t1"], "nombre");
    }
}
