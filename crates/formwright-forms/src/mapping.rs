//! Semantic type → renderer resolution.
//!
//! The [`MappingRegistry`] is the static table built at setup time. The
//! [`MappingResolver`] consults a discovery cache, then the registry, then
//! the namespaces, and memoizes whatever it finds.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use formwright_core::utils::text::camelize;
use formwright_core::{FormError, FormResult};

use crate::discovery::{
    DiscoveryCache, InputNamespace, NamespaceCatalog, StaticNamespace, DEFAULT_NAMESPACE,
    GLOBAL_NAMESPACE,
};
use crate::inputs::{RendererFactory, BUILTIN_MAPPINGS};

/// The semantic type → factory table.
///
/// Entries can be added or overridden while the environment is being set
/// up; the table is read-only once the environment is built.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    entries: HashMap<String, Arc<RendererFactory>>,
}

impl MappingRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, backed by the factories of `defaults`.
    pub fn builtin(defaults: &StaticNamespace) -> Self {
        let mut registry = Self::new();
        for (input_name, types) in BUILTIN_MAPPINGS {
            if let Some(factory) = defaults.lookup(input_name) {
                registry.map_type(types, &factory);
            }
        }
        registry
    }

    /// Maps each of `types` to `factory`, replacing existing entries.
    pub fn map_type(&mut self, types: &[&str], factory: &Arc<RendererFactory>) {
        for input_type in types {
            self.entries
                .insert((*input_type).to_string(), Arc::clone(factory));
        }
    }

    /// Returns the registered factory for `input_type`.
    pub fn get(&self, input_type: &str) -> Option<&Arc<RendererFactory>> {
        self.entries.get(input_type)
    }

    /// The number of mapped types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no type is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves semantic types to renderer factories.
pub struct MappingResolver<'a> {
    registry: &'a MappingRegistry,
    namespaces: &'a NamespaceCatalog,
    custom_namespaces: &'a [String],
    inputs_discovery: bool,
    cache: &'a dyn DiscoveryCache,
}

impl<'a> MappingResolver<'a> {
    /// Creates a resolver over borrowed setup state.
    pub fn new(
        registry: &'a MappingRegistry,
        namespaces: &'a NamespaceCatalog,
        custom_namespaces: &'a [String],
        inputs_discovery: bool,
        cache: &'a dyn DiscoveryCache,
    ) -> Self {
        Self {
            registry,
            namespaces,
            custom_namespaces,
            inputs_discovery,
            cache,
        }
    }

    /// Resolves `input_type` to a factory.
    ///
    /// Cached entries are returned as is. For a registry hit on a built-in
    /// input, a factory with the same name in a custom namespace (or, with
    /// discovery on, the global namespace) takes precedence over the registry
    /// entry; inputs mapped by the host are used as registered. For a registry
    /// miss, `PascalCase(input_type) + "Input"` is searched in the custom
    /// namespaces, the global namespace (with discovery on), and the default
    /// namespace.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::LookupError`] naming every namespace attempted
    /// when no factory is found.
    pub fn resolve(&self, input_type: &str) -> FormResult<Arc<RendererFactory>> {
        if let Some(factory) = self.cache.get(input_type) {
            debug!(input_type, renderer = %factory.qualified_name(), "discovery cache hit");
            return Ok(factory);
        }
        debug!(input_type, "discovery cache miss");

        let factory = match self.registry.get(input_type) {
            Some(entry) if entry.namespace() != DEFAULT_NAMESPACE => Arc::clone(entry),
            Some(entry) => {
                let (found, _) = self.search(entry.name(), self.override_namespaces());
                match found {
                    Some(custom) => {
                        debug!(
                            input_type,
                            renderer = %custom.qualified_name(),
                            "namespace overrides mapped input"
                        );
                        custom
                    }
                    None => Arc::clone(entry),
                }
            }
            None => {
                let candidate = format!("{}Input", camelize(input_type));
                let mut order = self.override_namespaces();
                order.push(DEFAULT_NAMESPACE);
                let (found, attempted) = self.search(&candidate, order);
                found.ok_or_else(|| FormError::lookup(input_type, &candidate, attempted))?
            }
        };

        Ok(self.cache.insert(input_type, factory))
    }

    /// Namespaces searched for overrides: custom namespaces in configured
    /// order, then the global namespace when discovery is on.
    fn override_namespaces(&self) -> Vec<&'a str> {
        let mut order: Vec<&'a str> = self.custom_namespaces.iter().map(String::as_str).collect();
        if self.inputs_discovery {
            order.push(GLOBAL_NAMESPACE);
        }
        order
    }

    /// First-match search; also returns the namespaces attempted.
    fn search(&self, input_name: &str, order: Vec<&str>) -> (Option<Arc<RendererFactory>>, Vec<String>) {
        let mut attempted = Vec::with_capacity(order.len());
        for name in order {
            attempted.push(name.to_string());
            let Some(namespace) = self.namespaces.get(name) else {
                if name != GLOBAL_NAMESPACE {
                    warn!(namespace = name, "custom inputs namespace is not registered");
                }
                continue;
            };
            if let Some(factory) = namespace.lookup(input_name) {
                return (Some(factory), attempted);
            }
        }
        (None, attempted)
    }
}
