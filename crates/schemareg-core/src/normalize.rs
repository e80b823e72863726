//! # Document Normalization
//!
//! Documents are allowed to send `"field": null` for optional fields, while
//! schemas express optionality through `required` rather than nullable
//! types. Before validation every null-valued object member is removed, at
//! every depth, so an explicit `null` reads as "field absent".

use serde_json::Value;

/// Remove every object member whose value is `null`, recursively.
///
/// Objects nested inside arrays are normalized too. `null` array elements
/// and a top-level `null` are left alone: they are values, not absent
/// fields. The operation is idempotent.
pub fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            for v in map.values_mut() {
                strip_nulls(v);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_nulls(item);
            }
        }
        _ => {}
    }
}
