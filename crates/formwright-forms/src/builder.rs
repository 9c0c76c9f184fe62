//! The caller-facing API.
//!
//! A [`FormEnvironment`] is built once from [`Settings`]: it owns the type
//! resolver, mapping registry, namespaces, wrappers and the shared discovery
//! cache. A [`FormBuilder`] renders the fields of one form against one
//! (optional) bound object.
//!
//! ```
//! use std::sync::Arc;
//!
//! use formwright_core::settings::Settings;
//! use formwright_forms::builder::{FormBuilder, FormEnvironment};
//! use formwright_forms::model::{BoundModel, Column, ColumnType, ModelSnapshot};
//! use formwright_forms::options::options;
//! use serde_json::json;
//!
//! let env = Arc::new(FormEnvironment::new(Settings::default()).unwrap());
//! let user: Arc<dyn BoundModel> =
//!     Arc::new(ModelSnapshot::new("user").column("email", Column::new(ColumnType::String)));
//! let form = FormBuilder::new(env, "user", Some(user));
//!
//! let field = form.input("email", options(json!({"hint": "Work address"}))).unwrap();
//! assert_eq!(field.kinds(), vec!["label", "control", "hint"]);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing::debug;

use formwright_core::settings::{Settings, WrapperSettings, SETTINGS};
use formwright_core::{FormError, FormResult};

use crate::association::{AssociationAttributeResolver, AssociationCollectionResolver};
use crate::components;
use crate::discovery::{
    DiscoveryCache, InputNamespace, LocalDiscoveryCache, NamespaceCatalog, SharedDiscoveryCache,
    StaticNamespace, GLOBAL_NAMESPACE,
};
use crate::fragment::{push_class, ButtonFragment, Fragment, HintFragment, RenderedField};
use crate::inputs::{default_namespace, Input, InputContext, RendererFactory};
use crate::mapping::{MappingRegistry, MappingResolver};
use crate::model::BoundModel;
use crate::options::{class_list, Options};
use crate::renderer::FieldRenderer;
use crate::type_resolver::TypeResolver;
use crate::wrappers::{Wrapper, WrapperRegistry, WrapperResolver};

static GLOBAL_ENVIRONMENT: OnceCell<Arc<FormEnvironment>> = OnceCell::new();

/// Setup-time state shared by every form of a host.
pub struct FormEnvironment {
    settings: Arc<Settings>,
    types: TypeResolver,
    registry: MappingRegistry,
    namespaces: NamespaceCatalog,
    wrappers: WrapperRegistry,
    shared_cache: SharedDiscoveryCache,
}

impl FormEnvironment {
    /// Builds an environment with the built-in inputs only.
    ///
    /// # Errors
    ///
    /// Fails on invalid custom patterns or wrapper definitions.
    pub fn new(settings: Settings) -> FormResult<Self> {
        Self::builder(settings).build()
    }

    /// Starts building an environment with custom inputs and namespaces.
    pub fn builder(settings: Settings) -> FormEnvironmentBuilder {
        FormEnvironmentBuilder::new(settings)
    }

    /// The environment built from the globally configured [`SETTINGS`], or
    /// from defaults when nothing was configured. Built on first use.
    ///
    /// # Errors
    ///
    /// Fails if the global settings do not describe a valid environment.
    pub fn global() -> FormResult<Arc<Self>> {
        GLOBAL_ENVIRONMENT
            .get_or_try_init(|| {
                let settings = SETTINGS.try_get().cloned().unwrap_or_default();
                Self::new(settings).map(Arc::new)
            })
            .cloned()
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub const fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    pub const fn namespaces(&self) -> &NamespaceCatalog {
        &self.namespaces
    }

    pub const fn wrappers(&self) -> &WrapperRegistry {
        &self.wrappers
    }

    /// The discovery cache shared by builders with `cache_discovery` on.
    pub const fn shared_cache(&self) -> &SharedDiscoveryCache {
        &self.shared_cache
    }
}

impl fmt::Debug for FormEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormEnvironment")
            .field("namespaces", &self.namespaces)
            .field("mapped_types", &self.registry.len())
            .field("cached_types", &self.shared_cache.len())
            .finish_non_exhaustive()
    }
}

/// Collects custom inputs, namespaces and wrappers for a [`FormEnvironment`].
pub struct FormEnvironmentBuilder {
    settings: Settings,
    defaults: StaticNamespace,
    global: StaticNamespace,
    namespaces: Vec<Arc<dyn InputNamespace>>,
    mappings: Vec<(Vec<String>, Arc<RendererFactory>)>,
}

impl FormEnvironmentBuilder {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            defaults: default_namespace(),
            global: StaticNamespace::new(GLOBAL_NAMESPACE),
            namespaces: Vec::new(),
            mappings: Vec::new(),
        }
    }

    /// Registers a custom namespace. List its name in
    /// `custom_inputs_namespaces` to have it searched.
    #[must_use]
    pub fn namespace(mut self, namespace: Arc<dyn InputNamespace>) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Registers an input in the global namespace, found by the
    /// conventional `{Type}Input` name when discovery is on.
    #[must_use]
    pub fn global_input<F>(mut self, input_name: &str, constructor: F) -> Self
    where
        F: Fn(InputContext) -> Box<dyn Input> + Send + Sync + 'static,
    {
        self.global.register(input_name, constructor);
        self
    }

    /// Maps semantic types directly to a renderer.
    #[must_use]
    pub fn map_type<F>(mut self, types: &[&str], input_name: &str, constructor: F) -> Self
    where
        F: Fn(InputContext) -> Box<dyn Input> + Send + Sync + 'static,
    {
        let factory = Arc::new(RendererFactory::new(input_name, GLOBAL_NAMESPACE, constructor));
        self.mappings
            .push((types.iter().map(|t| (*t).to_string()).collect(), factory));
        self
    }

    /// Adds or replaces a named wrapper.
    #[must_use]
    pub fn wrapper(mut self, name: impl Into<String>, wrapper: WrapperSettings) -> Self {
        self.settings.wrappers.insert(name.into(), wrapper);
        self
    }

    /// Builds the environment.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ConfigurationError`] for invalid custom patterns
    /// or unknown wrapper components, and [`FormError::WrapperNotFound`] if
    /// the default wrapper is not defined.
    pub fn build(self) -> FormResult<FormEnvironment> {
        let types = TypeResolver::from_settings(&self.settings)?;
        let wrappers = WrapperRegistry::from_settings(&self.settings)?;
        wrappers.get(&self.settings.default_wrapper)?;

        let mut registry = MappingRegistry::builtin(&self.defaults);
        for (mapped, factory) in &self.mappings {
            let mapped: Vec<&str> = mapped.iter().map(String::as_str).collect();
            registry.map_type(&mapped, factory);
        }

        let mut namespaces = NamespaceCatalog::new();
        namespaces.register(Arc::new(self.defaults));
        namespaces.register(Arc::new(self.global));
        for namespace in self.namespaces {
            namespaces.register(namespace);
        }
        debug!(namespaces = ?namespaces.names(), "form environment built");

        Ok(FormEnvironment {
            settings: Arc::new(self.settings),
            types,
            registry,
            namespaces,
            wrappers,
            shared_cache: SharedDiscoveryCache::new(),
        })
    }
}

/// Renders the fields of one form.
pub struct FormBuilder {
    env: Arc<FormEnvironment>,
    object_name: String,
    object: Option<Arc<dyn BoundModel>>,
    defaults: Options,
    wrapper: String,
    wrapper_mappings: HashMap<String, String>,
    local_cache: Option<LocalDiscoveryCache>,
}

impl FormBuilder {
    /// Creates a builder for `object_name`, optionally bound to an object.
    ///
    /// With `cache_discovery` off, resolved renderers are cached per builder
    /// instead of in the environment.
    pub fn new(env: Arc<FormEnvironment>, object_name: impl Into<String>, object: Option<Arc<dyn BoundModel>>) -> Self {
        let local_cache = (!env.settings.cache_discovery).then(LocalDiscoveryCache::new);
        let wrapper = env.settings.default_wrapper.clone();
        Self {
            env,
            object_name: object_name.into(),
            object,
            defaults: Options::new(),
            wrapper,
            wrapper_mappings: HashMap::new(),
            local_cache,
        }
    }

    /// Options merged under the options of every field.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    /// The wrapper used when no mapping applies.
    #[must_use]
    pub fn with_wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.wrapper = wrapper.into();
        self
    }

    /// Maps a semantic type to a wrapper for this form only.
    #[must_use]
    pub fn with_wrapper_mapping(mut self, input_type: impl Into<String>, wrapper: impl Into<String>) -> Self {
        self.wrapper_mappings.insert(input_type.into(), wrapper.into());
        self
    }

    pub fn object_name(&self) -> &str {
        &self.object_name
    }

    /// The discovery cache this builder resolves through.
    pub fn cache(&self) -> &dyn DiscoveryCache {
        match &self.local_cache {
            Some(local) => local as &dyn DiscoveryCache,
            None => &self.env.shared_cache,
        }
    }

    fn renderer(&self) -> FieldRenderer<'_> {
        let env = &self.env;
        FieldRenderer {
            object_name: &self.object_name,
            object: self.object.as_ref(),
            settings: &env.settings,
            types: &env.types,
            mappings: MappingResolver::new(
                &env.registry,
                &env.namespaces,
                &env.settings.custom_inputs_namespaces,
                env.settings.inputs_discovery,
                self.cache(),
            ),
            wrappers: WrapperResolver::new(&env.wrappers),
            defaults: &self.defaults,
            wrapper_mappings: &self.wrapper_mappings,
            default_wrapper: &self.wrapper,
        }
    }

    /// Renders a full field for `attribute`.
    ///
    /// # Errors
    ///
    /// Fails when no renderer or wrapper can be resolved.
    pub fn input(&self, attribute: &str, options: Options) -> FormResult<RenderedField> {
        let renderer = self.renderer();
        let field = renderer.describe(attribute, options);
        renderer.render_field(field, None)
    }

    /// Renders a full field with `content` in place of the control.
    ///
    /// # Errors
    ///
    /// Fails when the wrapper cannot be resolved.
    pub fn input_with(&self, attribute: &str, options: Options, content: impl Into<String>) -> FormResult<RenderedField> {
        let renderer = self.renderer();
        let field = renderer.describe(attribute, options);
        renderer.render_field(field, Some(content.into()))
    }

    /// Renders only the control for `attribute`.
    ///
    /// # Errors
    ///
    /// Fails when no renderer or wrapper can be resolved.
    pub fn input_field(&self, attribute: &str, options: Options) -> FormResult<Fragment> {
        self.renderer().render_field_only(attribute, options)
    }

    /// Renders a field for the association `name`.
    ///
    /// The control defaults to a select over the association's records.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::ConfigurationError`] without a bound object, for
    /// unknown associations and for `has_one` associations.
    pub fn association(&self, name: &str, mut options: Options) -> FormResult<RenderedField> {
        let object = self.object.as_ref().ok_or_else(|| {
            FormError::ConfigurationError(format!(
                "association '{name}' needs a bound object on form '{}'",
                self.object_name
            ))
        })?;
        let reflection = object.reflect_association(name).ok_or_else(|| {
            FormError::ConfigurationError(format!(
                "association '{name}' not found on '{}'",
                object.model_name()
            ))
        })?;

        options
            .entry("as")
            .or_insert_with(|| Value::from("select"));
        let resolved = AssociationAttributeResolver::resolve(&reflection.reference(), options, object.as_ref())?;
        let mut options = resolved.options;
        let collection =
            AssociationCollectionResolver::fetch(&reflection, options.get("collection"), object.as_ref());
        options.insert("collection".into(), Value::Array(collection));

        let renderer = self.renderer();
        let mut field = renderer.describe(&resolved.attribute, options);
        field.reflection = Some(reflection.name);
        renderer.render_field(field, None)
    }

    /// A form button with the configured button class.
    pub fn button(&self, button_type: &str, value: &str, mut options: Options) -> Fragment {
        let mut classes = Vec::new();
        push_class(&mut classes, &self.env.settings.button_class);
        for class in class_list(options.remove("class").as_ref()) {
            push_class(&mut classes, &class);
        }
        Fragment::Button(ButtonFragment {
            button_type: button_type.to_string(),
            value: value.to_string(),
            classes,
            attributes: options,
        })
    }

    fn context(&self, attribute: &str, options: Options) -> InputContext {
        let field = self.renderer().describe(attribute, options);
        InputContext {
            object_name: self.object_name.clone(),
            object: self.object.clone(),
            field,
            settings: Arc::clone(&self.env.settings),
        }
    }

    /// A standalone label for `attribute`.
    pub fn label(&self, attribute: &str, options: Options) -> Fragment {
        let context = self.context(attribute, options);
        let required = context.is_required();
        components::label(&context, required, &Options::new())
    }

    /// A standalone error for `attribute`, if it has errors.
    pub fn error(&self, attribute: &str, options: Options) -> Option<Fragment> {
        components::error(&self.context(attribute, options), &Options::new())
    }

    /// A standalone full error (label text and message), if any.
    pub fn full_error(&self, attribute: &str, options: Options) -> Option<Fragment> {
        components::full_error(&self.context(attribute, options), &Options::new())
    }

    /// A standalone hint.
    pub fn hint(&self, text: impl Into<String>) -> Fragment {
        Fragment::Hint(HintFragment {
            text: text.into(),
            classes: vec!["hint".to_string()],
        })
    }

    /// Looks up a named wrapper of the environment.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::WrapperNotFound`] for unknown names.
    pub fn wrapper(&self, name: &str) -> FormResult<Arc<Wrapper>> {
        self.env.wrappers.get(name)
    }
}

impl fmt::Debug for FormBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormBuilder")
            .field("object_name", &self.object_name)
            .field("wrapper", &self.wrapper)
            .field("local_cache", &self.local_cache.is_some())
            .finish_non_exhaustive()
    }
}
