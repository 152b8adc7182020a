//! JSON helpers shared by the loader and exporter.

use serde_json::{Map as JsonMap, Value};

/// Returns a map with a single key-value entry, e.g. `{"@id": value}`.
pub(crate) fn single_entry_map(
    id: impl Into<String>,
    value: impl Into<Value>,
) -> JsonMap<String, Value> {
    let mut map = JsonMap::new();
    map.insert(id.into(), value.into());
    map
}

/// Returns the values of a JSON-LD expanded property entry as a slice,
/// treating both a bare array and a single already-expanded array the
/// same way (expanded form always uses arrays, but callers constructing
/// test fixtures by hand sometimes don't bother).
pub(crate) fn as_array(value: &Value) -> &[Value] {
    match value {
        Value::Array(values) => values.as_slice(),
        Value::Null => &[],
        other => std::slice::from_ref(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_entry_map_builds_an_id_object() {
        let map = single_entry_map("@id", "http://example.org/a");
        assert_eq!(map.get("@id"), Some(&json!("http://example.org/a")));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn as_array_normalizes_a_bare_value() {
        assert_eq!(as_array(&json!([1, 2])), &[json!(1), json!(2)]);
        assert_eq!(as_array(&json!(1)), &[json!(1)]);
        assert!(as_array(&Value::Null).is_empty());
    }
}
