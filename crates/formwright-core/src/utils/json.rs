//! Deep merging of JSON values.
//!
//! Used both for layering configuration files over default settings and for
//! layering call-site field options over form-level defaults.

use serde_json::{Map, Value};

/// Deep-merges two JSON values. The `override_val` takes precedence.
///
/// Objects are merged key by key, recursively. Any other combination
/// (including arrays) is replaced wholesale by the override.
///
/// # Examples
///
/// ```
/// use formwright_core::utils::json::deep_merge;
/// use serde_json::json;
///
/// let merged = deep_merge(json!({"a": {"x": 1, "y": 2}}), json!({"a": {"y": 3}}));
/// assert_eq!(merged, json!({"a": {"x": 1, "y": 3}}));
/// ```
pub fn deep_merge(base: Value, override_val: Value) -> Value {
    match (base, override_val) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            Value::Object(deep_merge_maps(base_map, override_map))
        }
        (_, override_val) => override_val,
    }
}

/// Deep-merges two JSON maps. Keys in `overlay` win.
pub fn deep_merge_maps(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, override_v) in overlay {
        let merged = if let Some(base_v) = base.remove(&key) {
            deep_merge(base_v, override_v)
        } else {
            override_v
        };
        base.insert(key, merged);
    }
    base
}
