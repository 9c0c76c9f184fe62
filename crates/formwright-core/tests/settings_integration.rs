//! Integration tests for settings loading, global configuration and logging.

use formwright_core::logging::{field_span, setup_logging};
use formwright_core::settings::{ErrorMethod, Settings, SETTINGS};
use formwright_core::{settings_loader, FormError};

// ============================================================================
// Configuration files
// ============================================================================

#[test]
fn test_toml_and_json_describe_the_same_settings() {
    let dir = std::env::temp_dir().join("formwright_settings_integration");
    std::fs::create_dir_all(&dir).unwrap();

    let toml_path = dir.join("forms.toml");
    std::fs::write(
        &toml_path,
        r#"
default_wrapper = "vertical"
error_method = "to_sentence"
custom_inputs_namespaces = ["app::inputs"]

[wrappers.vertical]
tag = "div"
class = ["form-group"]
error_class = "has-error"

[[wrappers.vertical.components]]
name = "label_input"

[[wrappers.vertical.components]]
name = "error"
"#,
    )
    .unwrap();

    let json_path = dir.join("forms.json");
    std::fs::write(
        &json_path,
        r#"{
            "default_wrapper": "vertical",
            "error_method": "to_sentence",
            "custom_inputs_namespaces": ["app::inputs"],
            "wrappers": {
                "vertical": {
                    "tag": "div",
                    "class": ["form-group"],
                    "error_class": "has-error",
                    "components": [{"name": "label_input"}, {"name": "error"}]
                }
            }
        }"#,
    )
    .unwrap();

    let from_toml = settings_loader::from_toml_file(&toml_path).unwrap();
    let from_json = settings_loader::from_json_file(&json_path).unwrap();

    for settings in [&from_toml, &from_json] {
        assert_eq!(settings.default_wrapper, "vertical");
        assert_eq!(settings.error_method, ErrorMethod::ToSentence);
        assert_eq!(settings.custom_inputs_namespaces, vec!["app::inputs".to_string()]);
        assert!(settings.wrappers.contains_key("default"));
        assert_eq!(settings.wrappers.len(), 2);
    }
    assert_eq!(from_toml.wrappers["vertical"], from_json.wrappers["vertical"]);

    std::fs::remove_file(&toml_path).ok();
    std::fs::remove_file(&json_path).ok();
    std::fs::remove_dir(&dir).ok();
}

#[test]
fn test_invalid_configuration_is_a_configuration_error() {
    let err = settings_loader::from_json_str(r#"{"wrappers": {"x": {"components": "label"}}}"#).unwrap_err();
    assert!(matches!(err, FormError::ConfigurationError(_)));
    assert!(err.is_configuration());
}

// ============================================================================
// Global settings and logging
// ============================================================================

#[test]
fn test_global_settings_configure_once() {
    assert!(!SETTINGS.is_configured());

    let mut settings = Settings::default();
    settings.button_class = "btn".into();
    SETTINGS.configure(settings);

    assert!(SETTINGS.is_configured());
    assert_eq!(SETTINGS.get().button_class, "btn");
    assert_eq!(SETTINGS.try_get().map(|s| s.default_wrapper.as_str()), Some("default"));
}

#[test]
fn test_setup_logging_is_idempotent() {
    let settings = Settings {
        log_level: "formwright=debug".into(),
        ..Settings::default()
    };
    setup_logging(&settings);
    setup_logging(&settings);

    let span = field_span("user", "email");
    let _guard = span.enter();
    tracing::debug!("inside field span");
}
