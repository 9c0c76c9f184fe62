//! Wrapper templates and wrapper selection.
//!
//! A [`Wrapper`] is the render-ready form of a
//! [`WrapperSettings`](formwright_core::settings::WrapperSettings): an outer
//! element plus an ordered list of components. Components are validated
//! when the wrapper is built, so rendering never meets an unknown name.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use formwright_core::settings::{ComponentSettings, Settings, WrapperSettings};
use formwright_core::{FormError, FormResult};

use crate::components::ATTRIBUTE_COMPONENTS;
use crate::options::Options;

/// Leaf components that produce output.
pub const OUTPUT_COMPONENTS: &[&str] = &["label", "label_input", "input", "hint", "error", "full_error"];

/// One component of a wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    /// The component name; also the option key that switches it off.
    pub name: String,
    /// Render options, such as `class` for a label or error.
    pub options: Options,
    /// Optional components only render when the field options enable them.
    pub optional: bool,
    /// Element tag of a group.
    pub tag: Option<String>,
    /// Classes of a group.
    pub classes: Vec<String>,
    /// Children of a group; empty for leaves.
    pub components: Vec<ComponentSpec>,
}

impl ComponentSpec {
    fn from_settings(settings: &ComponentSettings) -> FormResult<Self> {
        let components = settings
            .components
            .iter()
            .map(Self::from_settings)
            .collect::<FormResult<Vec<_>>>()?;

        if components.is_empty() {
            let name = settings.name.as_str();
            if !OUTPUT_COMPONENTS.contains(&name) && !ATTRIBUTE_COMPONENTS.contains(&name) {
                return Err(FormError::ConfigurationError(format!(
                    "unknown wrapper component '{name}'"
                )));
            }
        }

        Ok(Self {
            name: settings.name.clone(),
            options: settings.options.clone(),
            optional: settings.optional,
            tag: settings.tag.clone(),
            classes: settings.class.clone(),
            components,
        })
    }

    /// Returns `true` if the component is a group of other components.
    pub fn is_group(&self) -> bool {
        !self.components.is_empty()
    }
}

/// A render-ready wrapper template.
#[derive(Debug, Clone, PartialEq)]
pub struct Wrapper {
    /// The name the wrapper was registered under (`inline` for inline ones).
    pub name: String,
    pub tag: Option<String>,
    pub classes: Vec<String>,
    pub error_class: Option<String>,
    pub hint_class: Option<String>,
    pub valid_class: Option<String>,
    /// Components in render order.
    pub components: Vec<ComponentSpec>,
}

impl Wrapper {
    /// Builds a wrapper from its settings.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ConfigurationError`] if a leaf component has an
    /// unknown name.
    pub fn from_settings(name: impl Into<String>, settings: &WrapperSettings) -> FormResult<Self> {
        let components = settings
            .components
            .iter()
            .map(ComponentSpec::from_settings)
            .collect::<FormResult<Vec<_>>>()?;
        Ok(Self {
            name: name.into(),
            tag: settings.tag.clone(),
            classes: settings.class.clone(),
            error_class: settings.error_class.clone(),
            hint_class: settings.hint_class.clone(),
            valid_class: settings.valid_class.clone(),
            components,
        })
    }

    /// Builds an inline wrapper from a JSON definition.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ConfigurationError`] if the definition does not
    /// describe a wrapper or names an unknown component.
    pub fn from_value(value: &Value) -> FormResult<Self> {
        let settings: WrapperSettings = serde_json::from_value(value.clone())
            .map_err(|e| FormError::ConfigurationError(format!("invalid inline wrapper: {e}")))?;
        Self::from_settings("inline", &settings)
    }

    /// Names of every leaf component, groups flattened, in order.
    pub fn component_names(&self) -> Vec<&str> {
        fn collect<'a>(components: &'a [ComponentSpec], out: &mut Vec<&'a str>) {
            for component in components {
                if component.is_group() {
                    collect(&component.components, out);
                } else {
                    out.push(&component.name);
                }
            }
        }
        let mut names = Vec::new();
        collect(&self.components, &mut names);
        names
    }

    /// Returns `true` if the wrapper declares the leaf component anywhere.
    pub fn declares(&self, component: &str) -> bool {
        self.component_names().contains(&component)
    }
}

/// Every named wrapper of an environment.
#[derive(Debug, Clone, Default)]
pub struct WrapperRegistry {
    wrappers: HashMap<String, Arc<Wrapper>>,
}

impl WrapperRegistry {
    /// Builds every wrapper declared in `settings.wrappers`.
    ///
    /// # Errors
    ///
    /// Fails on the first wrapper that names an unknown component.
    pub fn from_settings(settings: &Settings) -> FormResult<Self> {
        let mut registry = Self::default();
        for (name, wrapper) in &settings.wrappers {
            registry.register(Wrapper::from_settings(name.clone(), wrapper)?);
        }
        Ok(registry)
    }

    /// Adds or replaces a wrapper.
    pub fn register(&mut self, wrapper: Wrapper) {
        self.wrappers.insert(wrapper.name.clone(), Arc::new(wrapper));
    }

    /// Looks up a wrapper by name.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::WrapperNotFound`] for unknown names.
    pub fn get(&self, name: &str) -> FormResult<Arc<Wrapper>> {
        self.wrappers
            .get(name)
            .cloned()
            .ok_or_else(|| FormError::WrapperNotFound(name.to_string()))
    }
}

/// Picks the wrapper for one field.
#[derive(Debug, Clone, Copy)]
pub struct WrapperResolver<'a> {
    registry: &'a WrapperRegistry,
}

impl<'a> WrapperResolver<'a> {
    pub const fn new(registry: &'a WrapperRegistry) -> Self {
        Self { registry }
    }

    /// Selects the wrapper: the explicit `wrapper` option (a name or an
    /// inline definition), then the per-form mapping for the semantic type,
    /// then the global mapping, then the form's default wrapper.
    ///
    /// An explicit `false` or `null` falls through to the next level.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::WrapperNotFound`] for unknown names and
    /// [`FormError::ConfigurationError`] for malformed inline definitions.
    pub fn resolve(
        &self,
        input_type: &str,
        explicit: Option<&Value>,
        per_form: &HashMap<String, String>,
        global: &HashMap<String, String>,
        default: &str,
    ) -> FormResult<Arc<Wrapper>> {
        match explicit {
            Some(Value::String(name)) => return self.registry.get(name),
            Some(definition @ Value::Object(_)) => return Wrapper::from_value(definition).map(Arc::new),
            _ => {}
        }

        let name = per_form
            .get(input_type)
            .or_else(|| global.get(input_type))
            .map_or(default, String::as_str);
        self.registry.get(name)
    }
}
