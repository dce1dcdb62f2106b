//! JSON helpers.

use serde_json::{Map, Value};

/// Recursively reorder object keys, comparing them case-insensitively.
///
/// Arrays keep their element order; only the objects inside them are sorted.
/// Relies on `serde_json`'s `preserve_order` feature so the insertion order
/// survives serialization.
pub fn sort_json_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(sort_json_keys).collect()),
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.to_uppercase().cmp(&b.to_uppercase()));

            let mut sorted = Map::with_capacity(entries.len());
            for (key, value) in entries {
                sorted.insert(key, sort_json_keys(value));
            }
            Value::Object(sorted)
        }
        other => other,
    }
}

/// Pretty-print a value with sorted keys and four-space indentation.
pub fn to_sorted_pretty_string(value: Value) -> serde_json::Result<String> {
    let sorted = sort_json_keys(value);
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(&sorted, &mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&out).into_owned())
}
