//! Renderer namespaces and the discovery cache.
//!
//! A namespace is a named lookup strategy: given a conventional renderer name
//! such as `CurrencyInput`, it either returns a factory or declines. The
//! [`NamespaceCatalog`] holds every namespace the host registered; the
//! mapping resolver walks them in a configured order.
//!
//! Successful lookups are memoized in a [`DiscoveryCache`]. Two
//! implementations exist: [`SharedDiscoveryCache`], a concurrent table shared
//! by every form built from one environment, and [`LocalDiscoveryCache`],
//! owned by a single form builder.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use dashmap::DashMap;

use crate::inputs::{Input, InputContext, RendererFactory};

/// Name of the unscoped namespace that applications register inputs into.
pub const GLOBAL_NAMESPACE: &str = "::";

/// Name of the internal namespace holding the built-in inputs.
pub const DEFAULT_NAMESPACE: &str = "formwright::inputs";

/// A lookup strategy for renderer factories.
pub trait InputNamespace: Send + Sync {
    /// The namespace name, as referenced from `custom_inputs_namespaces`.
    fn name(&self) -> &str;

    /// Returns the factory registered under `input_name`, if any.
    fn lookup(&self, input_name: &str) -> Option<Arc<RendererFactory>>;
}

/// A namespace backed by a fixed table of factories.
#[derive(Clone)]
pub struct StaticNamespace {
    name: String,
    factories: HashMap<String, Arc<RendererFactory>>,
}

impl StaticNamespace {
    /// Creates an empty namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            factories: HashMap::new(),
        }
    }

    /// Registers a renderer under `input_name` and returns the namespace.
    #[must_use]
    pub fn with<F>(mut self, input_name: &str, constructor: F) -> Self
    where
        F: Fn(InputContext) -> Box<dyn Input> + Send + Sync + 'static,
    {
        self.register(input_name, constructor);
        self
    }

    /// Registers a renderer under `input_name`, replacing any previous entry.
    pub fn register<F>(&mut self, input_name: &str, constructor: F) -> Arc<RendererFactory>
    where
        F: Fn(InputContext) -> Box<dyn Input> + Send + Sync + 'static,
    {
        let factory = Arc::new(RendererFactory::new(input_name, self.name.clone(), constructor));
        self.factories
            .insert(input_name.to_string(), Arc::clone(&factory));
        factory
    }

    /// The number of registered factories.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl InputNamespace for StaticNamespace {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, input_name: &str) -> Option<Arc<RendererFactory>> {
        self.factories.get(input_name).cloned()
    }
}

impl fmt::Debug for StaticNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("StaticNamespace")
            .field("name", &self.name)
            .field("factories", &names)
            .finish()
    }
}

/// Every namespace known to an environment, by name.
#[derive(Clone, Default)]
pub struct NamespaceCatalog {
    namespaces: Vec<Arc<dyn InputNamespace>>,
}

impl NamespaceCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a namespace. A namespace with the same name replaces the old one.
    pub fn register(&mut self, namespace: Arc<dyn InputNamespace>) {
        self.namespaces.retain(|existing| existing.name() != namespace.name());
        self.namespaces.push(namespace);
    }

    /// Looks up a namespace by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn InputNamespace>> {
        self.namespaces.iter().find(|ns| ns.name() == name)
    }

    /// Registered namespace names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.namespaces.iter().map(|ns| ns.name()).collect()
    }
}

impl fmt::Debug for NamespaceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespaceCatalog")
            .field("namespaces", &self.names())
            .finish()
    }
}

/// Memo table from semantic type to resolved factory.
///
/// Entries are write-once: once a type is cached, later inserts for the same
/// type keep the first value and return it.
pub trait DiscoveryCache: Send + Sync {
    /// Returns the cached factory for `input_type`.
    fn get(&self, input_type: &str) -> Option<Arc<RendererFactory>>;

    /// Caches `factory` for `input_type` unless an entry exists, and returns
    /// the entry that is now stored.
    fn insert(&self, input_type: &str, factory: Arc<RendererFactory>) -> Arc<RendererFactory>;

    /// The number of cached types.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A concurrent cache shared across form builders.
#[derive(Debug, Default)]
pub struct SharedDiscoveryCache {
    entries: DashMap<String, Arc<RendererFactory>>,
}

impl SharedDiscoveryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiscoveryCache for SharedDiscoveryCache {
    fn get(&self, input_type: &str) -> Option<Arc<RendererFactory>> {
        self.entries
            .get(input_type)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn insert(&self, input_type: &str, factory: Arc<RendererFactory>) -> Arc<RendererFactory> {
        let entry = self
            .entries
            .entry(input_type.to_string())
            .or_insert(factory);
        Arc::clone(entry.value())
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A cache owned by a single form builder.
#[derive(Debug, Default)]
pub struct LocalDiscoveryCache {
    entries: RwLock<HashMap<String, Arc<RendererFactory>>>,
}

impl LocalDiscoveryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiscoveryCache for LocalDiscoveryCache {
    fn get(&self, input_type: &str) -> Option<Arc<RendererFactory>> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.get(input_type).cloned()
    }

    fn insert(&self, input_type: &str, factory: Arc<RendererFactory>) -> Arc<RendererFactory> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Arc::clone(entries.entry(input_type.to_string()).or_insert(factory))
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::StringInput;

    fn namespace(name: &str) -> StaticNamespace {
        StaticNamespace::new(name).with("CurrencyInput", |ctx| Box::new(StringInput::new(ctx)))
    }

    #[test]
    fn test_static_namespace_lookup() {
        let ns = namespace("app");
        let factory = ns.lookup("CurrencyInput").unwrap();
        assert_eq!(factory.name(), "CurrencyInput");
        assert_eq!(factory.namespace(), "app");
        assert!(ns.lookup("MissingInput").is_none());
        assert_eq!(ns.len(), 1);
    }

    #[test]
    fn test_static_namespace_returns_same_factory() {
        let ns = namespace("app");
        let a = ns.lookup("CurrencyInput").unwrap();
        let b = ns.lookup("CurrencyInput").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_catalog_replaces_by_name() {
        let mut catalog = NamespaceCatalog::new();
        catalog.register(Arc::new(namespace("app")));
        catalog.register(Arc::new(StaticNamespace::new("admin")));
        catalog.register(Arc::new(StaticNamespace::new("app")));
        assert_eq!(catalog.names(), vec!["admin", "app"]);
        assert!(catalog.get("app").unwrap().lookup("CurrencyInput").is_none());
        assert!(catalog.get("missing").is_none());
    }

    fn assert_write_once(cache: &dyn DiscoveryCache) {
        let ns = namespace("app").with("OtherInput", |ctx| Box::new(StringInput::new(ctx)));
        let first = ns.lookup("CurrencyInput").unwrap();
        let second = ns.lookup("OtherInput").unwrap();

        assert!(cache.is_empty());
        let stored = cache.insert("currency", Arc::clone(&first));
        assert!(Arc::ptr_eq(&stored, &first));

        let stored = cache.insert("currency", second);
        assert!(Arc::ptr_eq(&stored, &first));
        assert!(Arc::ptr_eq(&cache.get("currency").unwrap(), &first));
        assert_eq!(cache.len(), 1);
        assert!(cache.get("money").is_none());
    }

    #[test]
    fn test_shared_cache_write_once() {
        assert_write_once(&SharedDiscoveryCache::new());
    }

    #[test]
    fn test_local_cache_write_once() {
        assert_write_once(&LocalDiscoveryCache::new());
    }

    #[test]
    fn test_shared_cache_concurrent_inserts_agree() {
        let cache = Arc::new(SharedDiscoveryCache::new());
        let ns = Arc::new(namespace("app"));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let ns = Arc::clone(&ns);
                std::thread::spawn(move || {
                    let factory = ns.lookup("CurrencyInput").unwrap();
                    cache.insert("currency", factory)
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for result in &results {
            assert!(Arc::ptr_eq(result, &results[0]));
        }
        assert_eq!(cache.len(), 1);
    }
}
