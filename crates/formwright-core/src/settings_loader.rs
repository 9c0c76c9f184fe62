//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (deep-merged over the defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMWRIGHT_DEBUG` | `debug` |
//! | `FORMWRIGHT_LOG_LEVEL` | `log_level` |
//! | `FORMWRIGHT_DEFAULT_WRAPPER` | `default_wrapper` |
//! | `FORMWRIGHT_BUTTON_CLASS` | `button_class` |
//! | `FORMWRIGHT_CACHE_DISCOVERY` | `cache_discovery` |
//! | `FORMWRIGHT_INPUTS_DISCOVERY` | `inputs_discovery` |
//! | `FORMWRIGHT_BROWSER_VALIDATIONS` | `browser_validations` |
//! | `FORMWRIGHT_CUSTOM_INPUTS_NAMESPACES` | `custom_inputs_namespaces` (comma-separated) |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use formwright_core::settings_loader;
//!
//! // Load from TOML
//! let settings = settings_loader::from_toml_file("config/forms.toml").unwrap();
//!
//! // Load from JSON with environment overrides
//! let settings = settings_loader::from_json_file_with_env("config/forms.json").unwrap();
//! ```

use std::path::Path;

use crate::error::FormError;
use crate::settings::Settings;
use crate::utils::json::deep_merge;

/// Loads settings from a TOML string.
///
/// Any settings not present in the TOML keep their default values. Wrapper
/// tables are merged key by key, so declaring `[wrappers.inline]` keeps the
/// built-in `default` wrapper.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        FormError::ConfigurationError(format!(
            "Failed to read TOML file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
        FormError::ConfigurationError(format!(
            "Failed to read JSON file '{}': {e}",
            path.as_ref().display()
        ))
    })?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes" as true; anything else is false.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMWRIGHT_DEBUG") {
        settings.debug = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("FORMWRIGHT_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMWRIGHT_DEFAULT_WRAPPER") {
        settings.default_wrapper = val;
    }

    if let Ok(val) = std::env::var("FORMWRIGHT_BUTTON_CLASS") {
        settings.button_class = val;
    }

    if let Ok(val) = std::env::var("FORMWRIGHT_CACHE_DISCOVERY") {
        settings.cache_discovery = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("FORMWRIGHT_INPUTS_DISCOVERY") {
        settings.inputs_discovery = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("FORMWRIGHT_BROWSER_VALIDATIONS") {
        settings.browser_validations = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("FORMWRIGHT_CUSTOM_INPUTS_NAMESPACES") {
        settings.custom_inputs_namespaces = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

// ============================================================
// Helpers
// ============================================================

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, FormError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        FormError::SerializationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = deep_merge(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        FormError::ConfigurationError(format!("Failed to deserialize settings from {format}: {e}"))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::ErrorMethod;

    // ── TOML loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            button_class = "btn"
            input_field_error_class = "is-invalid"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.button_class, "btn");
        assert_eq!(settings.input_field_error_class.as_deref(), Some("is-invalid"));
        // Defaults preserved
        assert_eq!(settings.default_wrapper, "default");
    }

    #[test]
    fn test_from_toml_str_custom_mappings_keep_order() {
        let toml = r#"
            [[custom_mappings]]
            pattern = "_count$"
            input_type = "integer"

            [[custom_mappings]]
            pattern = "^body"
            input_type = "text"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(settings.custom_mappings.len(), 2);
        assert_eq!(settings.custom_mappings[0].input_type, "integer");
        assert_eq!(settings.custom_mappings[1].pattern, "^body");
    }

    #[test]
    fn test_from_toml_str_wrapper_added_next_to_default() {
        let toml = r#"
            [wrappers.inline]
            tag = "span"
            class = ["inline"]

            [[wrappers.inline.components]]
            name = "input"

            [[wrappers.inline.components]]
            name = "error"
            optional = true

            [wrapper_mappings]
            boolean = "inline"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(settings.wrappers.contains_key("default"));
        let inline = settings.wrappers.get("inline").unwrap();
        assert_eq!(inline.tag.as_deref(), Some("span"));
        assert_eq!(inline.components.len(), 2);
        assert!(inline.components[1].optional);
        assert_eq!(settings.wrapper_mappings.get("boolean").unwrap(), "inline");
    }

    #[test]
    fn test_from_toml_str_error_method() {
        let settings = from_toml_str(r#"error_method = "to_sentence""#).unwrap();
        assert_eq!(settings.error_method, ErrorMethod::ToSentence);
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert!(settings.cache_discovery);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str(r#"cache_discovery = "sometimes""#);
        assert!(matches!(result, Err(FormError::ConfigurationError(_))));
    }

    // ── JSON loading ────────────────────────────────────────────────

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "custom_inputs_namespaces": ["app::inputs", "shared::inputs"],
            "inputs_discovery": false,
            "log_level": "debug"
        }"#;

        let settings = from_json_str(json).unwrap();
        assert_eq!(
            settings.custom_inputs_namespaces,
            vec!["app::inputs".to_string(), "shared::inputs".to_string()]
        );
        assert!(!settings.inputs_discovery);
        assert_eq!(settings.log_level, "debug");
        // Defaults preserved
        assert_eq!(settings.button_class, "button");
    }

    #[test]
    fn test_from_json_str_empty_object() {
        let settings = from_json_str("{}").unwrap();
        assert!(settings.debug);
        assert!(settings.wrappers.contains_key("default"));
    }

    #[test]
    fn test_from_json_str_invalid() {
        let result = from_json_str("{invalid json");
        assert!(result.is_err());
    }

    // ── File loading ────────────────────────────────────────────────

    #[test]
    fn test_from_toml_file() {
        let dir = std::env::temp_dir().join("formwright_test_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.toml");

        std::fs::write(&path, "button_class = \"btn btn-primary\"\n").unwrap();

        let settings = from_toml_file(&path).unwrap();
        assert_eq!(settings.button_class, "btn btn-primary");

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_json_file() {
        let dir = std::env::temp_dir().join("formwright_test_json");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("test_settings.json");

        std::fs::write(&path, r#"{"required_by_default": false}"#).unwrap();

        let settings = from_json_file(&path).unwrap();
        assert!(!settings.required_by_default);

        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/nonexistent/path/forms.toml");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_file_missing() {
        let result = from_json_file("/nonexistent/path/forms.json");
        assert!(result.is_err());
    }

    // ── Environment variable overrides ──────────────────────────────

    #[test]
    fn test_apply_env_overrides_button_class() {
        let mut settings = Settings::default();
        std::env::set_var("FORMWRIGHT_BUTTON_CLASS", "env-btn");
        apply_env_overrides(&mut settings);
        assert_eq!(settings.button_class, "env-btn");
        std::env::remove_var("FORMWRIGHT_BUTTON_CLASS");
    }

    #[test]
    fn test_apply_env_overrides_cache_discovery() {
        let mut settings = Settings::default();
        std::env::set_var("FORMWRIGHT_CACHE_DISCOVERY", "0");
        apply_env_overrides(&mut settings);
        assert!(!settings.cache_discovery);
        std::env::remove_var("FORMWRIGHT_CACHE_DISCOVERY");
    }

    #[test]
    fn test_apply_env_overrides_inputs_discovery() {
        let mut settings = Settings::default();
        settings.inputs_discovery = false;
        std::env::set_var("FORMWRIGHT_INPUTS_DISCOVERY", "yes");
        apply_env_overrides(&mut settings);
        assert!(settings.inputs_discovery);
        std::env::remove_var("FORMWRIGHT_INPUTS_DISCOVERY");
    }

    #[test]
    fn test_apply_env_overrides_namespaces() {
        let mut settings = Settings::default();
        std::env::set_var("FORMWRIGHT_CUSTOM_INPUTS_NAMESPACES", "app::inputs, ,vendor::inputs");
        apply_env_overrides(&mut settings);
        assert_eq!(
            settings.custom_inputs_namespaces,
            vec!["app::inputs".to_string(), "vendor::inputs".to_string()]
        );
        std::env::remove_var("FORMWRIGHT_CUSTOM_INPUTS_NAMESPACES");
    }

    #[test]
    fn test_from_env_default_wrapper() {
        std::env::set_var("FORMWRIGHT_DEFAULT_WRAPPER", "vertical");
        let settings = from_env();
        assert_eq!(settings.default_wrapper, "vertical");
        std::env::remove_var("FORMWRIGHT_DEFAULT_WRAPPER");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("off"));
    }

    #[test]
    fn test_toml_to_json() {
        let toml_val: toml::Value = toml::from_str(
            r#"
            name = "test"
            count = 42
            flag = true
            items = [1, 2, 3]
            [nested]
            key = "value"
        "#,
        )
        .unwrap();

        let json = toml_to_json(toml_val);
        assert_eq!(json["name"], "test");
        assert_eq!(json["count"], 42);
        assert_eq!(json["flag"], true);
        assert_eq!(json["items"], serde_json::json!([1, 2, 3]));
        assert_eq!(json["nested"]["key"], "value");
    }

    // ── Full flow with env ──────────────────────────────────────────

    #[test]
    fn test_toml_with_env_override() {
        let dir = std::env::temp_dir().join("formwright_test_toml_env");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings_env.toml");

        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();

        std::env::set_var("FORMWRIGHT_LOG_LEVEL", "trace");

        let settings = from_toml_file_with_env(&path).unwrap();
        assert_eq!(settings.log_level, "trace");

        std::env::remove_var("FORMWRIGHT_LOG_LEVEL");
        std::fs::remove_file(&path).ok();
        std::fs::remove_dir(&dir).ok();
    }
}
