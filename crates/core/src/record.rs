//! Records and list normalisation.

use serde_json::Value;

use crate::schema::EntitySchema;

/// One entity instance: a flat JSON object keyed by field name.
pub type Record = serde_json::Map<String, Value>;

/// Identifier of `record` under `schema`, rendered as a string.
///
/// Strings are returned as-is and numbers in their decimal form. Missing,
/// null, or structured identifiers yield `None`.
pub fn record_key(schema: &EntitySchema, record: &Record) -> Option<String> {
    match record.get(schema.key_field)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Position of the record whose identifier equals `id`.
pub fn find_index(schema: &EntitySchema, records: &[Record], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| record_key(schema, r).as_deref() == Some(id))
}

/// Coerce a collection response into a list of records.
///
/// Some backend endpoints answer a list request with a single object
/// instead of an array; that object becomes a one-element list. `null`
/// yields an empty list. Non-object array elements are dropped.
pub fn normalize_list(body: Value) -> Vec<Record> {
    match body {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        Value::Object(map) => vec![map],
        _ => Vec::new(),
    }
}

/// Display form of a field value: strings unquoted, null as empty.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(true)) => "yes".to_string(),
        Some(Value::Bool(false)) => "no".to_string(),
        Some(other) => other.to_string(),
    }
}
