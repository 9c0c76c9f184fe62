//! Settings for formwright.
//!
//! This module provides the [`Settings`] struct, which holds all field
//! resolution and rendering configuration, and [`LazySettings`], a
//! globally-accessible, lazily-initialized settings instance.
//!
//! Wrapper templates are plain data here ([`WrapperSettings`] and
//! [`ComponentSettings`]) so they can be declared in configuration files;
//! the forms crate turns them into render-ready wrappers.

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// How multiple error messages on one attribute are reduced to a single
/// error fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMethod {
    /// Only the first message is shown.
    First,
    /// All messages joined into a sentence ("a, b and c").
    ToSentence,
}

/// An entry of the ordered custom name-pattern table.
///
/// Attributes whose name matches `pattern` (a regular expression) resolve to
/// `input_type` unless the caller passes an explicit `as` option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputMapping {
    /// Regular expression matched against the attribute name.
    pub pattern: String,
    /// The semantic type assigned on a match.
    pub input_type: String,
}

impl InputMapping {
    /// Creates a new pattern-table entry.
    pub fn new(pattern: impl Into<String>, input_type: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            input_type: input_type.into(),
        }
    }
}

/// A single component of a wrapper template.
///
/// A component is either a leaf (`label`, `input`, `hint`, `maxlength`, ...)
/// or, when `components` is non-empty, a group rendered as a nested element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSettings {
    /// The component name; also the option key that can switch it off.
    pub name: String,
    /// Optional components are off unless the field options enable them.
    #[serde(default)]
    pub optional: bool,
    /// Render options handed to the component.
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
    /// Tag of the nested element for groups.
    #[serde(default)]
    pub tag: Option<String>,
    /// CSS classes of the nested element for groups.
    #[serde(default)]
    pub class: Vec<String>,
    /// Children of a group, in render order.
    #[serde(default)]
    pub components: Vec<Self>,
}

impl ComponentSettings {
    /// A component that is always rendered unless its option is `false`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            optional: false,
            options: serde_json::Map::new(),
            tag: None,
            class: Vec::new(),
            components: Vec::new(),
        }
    }

    /// A component that is rendered only when its option is enabled.
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            optional: true,
            ..Self::new(name)
        }
    }

    /// A named group of components rendered inside its own element.
    pub fn group(
        name: impl Into<String>,
        tag: impl Into<String>,
        class: &[&str],
        components: Vec<Self>,
    ) -> Self {
        Self {
            tag: Some(tag.into()),
            class: class.iter().map(|c| (*c).to_string()).collect(),
            components,
            ..Self::new(name)
        }
    }

    /// Adds a render option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// A wrapper template: the outer element and the ordered components
/// rendered inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapperSettings {
    /// Tag of the outer element, or `None` to render components bare.
    #[serde(default)]
    pub tag: Option<String>,
    /// CSS classes always applied to the outer element.
    #[serde(default)]
    pub class: Vec<String>,
    /// Class added when the attribute has errors.
    #[serde(default)]
    pub error_class: Option<String>,
    /// Class added when a hint is rendered.
    #[serde(default)]
    pub hint_class: Option<String>,
    /// Class added when the object was validated and the attribute is valid.
    #[serde(default)]
    pub valid_class: Option<String>,
    /// Components in render order.
    #[serde(default)]
    pub components: Vec<ComponentSettings>,
}

impl WrapperSettings {
    /// Creates an empty wrapper with no outer element.
    pub fn new() -> Self {
        Self {
            tag: None,
            class: Vec::new(),
            error_class: None,
            hint_class: None,
            valid_class: None,
            components: Vec::new(),
        }
    }

    /// The built-in `default` wrapper.
    ///
    /// Mirrors the classic layout: attribute decorators first, then label and
    /// input, then hint and error.
    pub fn standard() -> Self {
        Self {
            tag: Some("div".to_string()),
            class: vec!["input".to_string()],
            error_class: Some("field_with_errors".to_string()),
            hint_class: Some("field_with_hint".to_string()),
            valid_class: None,
            components: vec![
                ComponentSettings::new("html5"),
                ComponentSettings::new("placeholder"),
                ComponentSettings::optional("maxlength"),
                ComponentSettings::optional("minlength"),
                ComponentSettings::optional("pattern"),
                ComponentSettings::optional("min_max"),
                ComponentSettings::optional("readonly"),
                ComponentSettings::new("label_input"),
                ComponentSettings::new("hint"),
                ComponentSettings::new("error"),
            ],
        }
    }

    /// Sets the outer element tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Adds a CSS class to the outer element.
    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class.push(class.into());
        self
    }

    /// Sets the error class.
    #[must_use]
    pub fn error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    /// Sets the valid class.
    #[must_use]
    pub fn valid_class(mut self, class: impl Into<String>) -> Self {
        self.valid_class = Some(class.into());
        self
    }

    /// Appends a component.
    #[must_use]
    pub fn component(mut self, component: ComponentSettings) -> Self {
        self.components.push(component);
        self
    }
}

impl Default for WrapperSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// The complete set of formwright settings.
///
/// Use [`SETTINGS`] to access the global instance, or pass a `Settings`
/// value directly when building a form environment.
///
/// # Examples
///
/// ```
/// use formwright_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.default_wrapper, "default");
/// assert!(settings.cache_discovery);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty logs instead of JSON).
    pub debug: bool,
    /// The log level (e.g. "info", "debug", "warn").
    pub log_level: String,

    // ── Type resolution ──────────────────────────────────────────────

    /// Ordered custom name-pattern table; first match wins.
    pub custom_mappings: Vec<InputMapping>,

    // ── Renderer discovery ───────────────────────────────────────────

    /// Custom renderer namespaces, searched in this order.
    pub custom_inputs_namespaces: Vec<String>,
    /// Share the discovery cache across every form of an environment
    /// instead of keeping one per form.
    pub cache_discovery: bool,
    /// Allow renderers to be discovered in the unscoped global namespace.
    pub inputs_discovery: bool,

    // ── Wrappers ─────────────────────────────────────────────────────

    /// Named wrapper definitions.
    pub wrappers: BTreeMap<String, WrapperSettings>,
    /// Wrapper used when nothing more specific applies.
    pub default_wrapper: String,
    /// Global semantic-type → wrapper-name mapping.
    pub wrapper_mappings: HashMap<String, String>,

    // ── Rendering ────────────────────────────────────────────────────

    /// CSS class added to every button.
    pub button_class: String,
    /// Class added to controls rendered in field-only mode when invalid.
    pub input_field_error_class: Option<String>,
    /// Class added to controls rendered in field-only mode when valid.
    pub input_field_valid_class: Option<String>,
    /// Class added to every control.
    pub input_class: Option<String>,
    /// Whether fields without a presence validator are required.
    pub required_by_default: bool,
    /// Whether html5 required/aria attributes are emitted.
    pub browser_validations: bool,
    /// How multiple errors are reduced to one message.
    pub error_method: ErrorMethod,
    /// Record attributes tried, in order, to label collection items.
    pub collection_label_methods: Vec<String>,
    /// Record attributes tried, in order, to value collection items.
    pub collection_value_methods: Vec<String>,
    /// Countries listed first in country selects.
    pub country_priority: Vec<String>,
    /// Time zones listed first in time zone selects.
    pub time_zone_priority: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut wrappers = BTreeMap::new();
        wrappers.insert("default".to_string(), WrapperSettings::standard());

        Self {
            // Core
            debug: true,
            log_level: "info".to_string(),

            // Type resolution
            custom_mappings: Vec::new(),

            // Renderer discovery
            custom_inputs_namespaces: Vec::new(),
            cache_discovery: true,
            inputs_discovery: true,

            // Wrappers
            wrappers,
            default_wrapper: "default".to_string(),
            wrapper_mappings: HashMap::new(),

            // Rendering
            button_class: "button".to_string(),
            input_field_error_class: None,
            input_field_valid_class: None,
            input_class: None,
            required_by_default: true,
            browser_validations: true,
            error_method: ErrorMethod::First,
            collection_label_methods: vec![
                "to_label".to_string(),
                "name".to_string(),
                "title".to_string(),
                "to_s".to_string(),
            ],
            collection_value_methods: vec!["id".to_string(), "to_s".to_string()],
            country_priority: Vec::new(),
            time_zone_priority: Vec::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup to set the
/// settings, then use [`get`](LazySettings::get) to access them.
///
/// # Panics
///
/// [`get`](LazySettings::get) panics if settings have not been configured.
/// [`configure`](LazySettings::configure) panics if called more than once.
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, or `None` before configuration.
    pub fn try_get(&self) -> Option<&Settings> {
        self.inner.get()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
///
/// Call `SETTINGS.configure(settings)` once at application startup, then
/// access settings via `SETTINGS.get()` anywhere in the workspace.
pub static SETTINGS: LazySettings = LazySettings::new();
