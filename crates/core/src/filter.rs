//! Client-side search over the in-memory list.

use serde_json::Value;

use crate::record::Record;
use crate::schema::EntitySchema;

/// Records whose search fields contain `term`, case-insensitively.
///
/// The term is used as typed, surrounding spaces included; only the empty
/// term matches everything. Source order is preserved and the source slice
/// is never modified.
pub fn filter_records<'a>(
    schema: &EntitySchema,
    records: &'a [Record],
    term: &str,
) -> Vec<&'a Record> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|r| matches(schema, r, &needle))
        .collect()
}

/// Whether any search field of `record` contains the lowercased `needle`.
pub fn matches(schema: &EntitySchema, record: &Record, needle: &str) -> bool {
    schema.search_fields.iter().any(|field| {
        let haystack = match record.get(*field) {
            Some(Value::String(s)) => s.to_lowercase(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return false,
        };
        haystack.contains(needle)
    })
}
