//! Field option maps.
//!
//! Options are JSON maps so that call sites, form-level defaults, and
//! configuration files all speak the same shape. A key set to `false` is
//! meaningful: it switches the matching wrapper component off.

use serde_json::{Map, Value};

use formwright_core::utils::json::deep_merge_maps;

/// An ordered map of field options (`as`, `collection`, `label`,
/// `input_html`, component switches, ...).
pub type Options = Map<String, Value>;

/// Builds an [`Options`] map from a `serde_json::json!` object literal.
///
/// Non-object values produce an empty map.
///
/// # Examples
///
/// ```
/// use formwright_forms::options::options;
/// use serde_json::json;
///
/// let opts = options(json!({"as": "text", "hint": false}));
/// assert_eq!(opts.len(), 2);
/// ```
pub fn options(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        _ => Options::new(),
    }
}

/// Layers call-site options over form-level defaults.
///
/// Nested maps such as `input_html` are merged key by key; on conflict the
/// call site wins.
pub fn merge_defaults(defaults: &Options, call_site: Options) -> Options {
    deep_merge_maps(defaults.clone(), call_site)
}

/// Returns `true` if `key` is explicitly set to `false`.
pub fn is_disabled(options: &Options, key: &str) -> bool {
    matches!(options.get(key), Some(Value::Bool(false)))
}

/// Returns `true` if `key` is present with a value other than `null` or `false`.
pub fn is_set(options: &Options, key: &str) -> bool {
    !matches!(options.get(key), None | Some(Value::Null | Value::Bool(false)))
}

/// Returns the string value of `key`, if it is a string.
pub fn str_option<'a>(options: &'a Options, key: &str) -> Option<&'a str> {
    options.get(key).and_then(Value::as_str)
}

/// Returns the boolean value of `key`, if it is a boolean.
pub fn bool_option(options: &Options, key: &str) -> Option<bool> {
    options.get(key).and_then(Value::as_bool)
}

/// Returns the nested map stored under `key`, if any.
pub fn map_option<'a>(options: &'a Options, key: &str) -> Option<&'a Options> {
    options.get(key).and_then(Value::as_object)
}

/// Returns the nested map stored under `key`, creating it when missing or
/// when the existing value is not a map.
pub fn map_option_mut<'a>(options: &'a mut Options, key: &str) -> &'a mut Options {
    let slot = options
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Options::new()));
    if !slot.is_object() {
        *slot = Value::Object(Options::new());
    }
    match slot {
        Value::Object(map) => map,
        _ => unreachable!("slot was just replaced by an object"),
    }
}

/// Splits a class option into individual class names.
///
/// Accepts a space-separated string or an array of strings.
pub fn class_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => s.split_whitespace().map(String::from).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .flat_map(str::split_whitespace)
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// Renders a scalar JSON value the way it appears in a label or attribute.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
