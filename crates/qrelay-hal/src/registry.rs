//! Backend registry.
//!
//! The [`BackendRegistry`] maps backend names to constructors. Names are
//! unique across every namespace that contributes to one registry.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::backend::Backend;
use crate::error::{HalError, HalResult};

/// Constructor for a backend instance.
type Factory = Box<dyn Fn() -> HalResult<Box<dyn Backend>> + Send + Sync>;

/// Name of a registered backend and the namespace that provided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendEntry {
    pub name: String,
    pub namespace: String,
}

struct Registered {
    namespace: String,
    factory: Factory,
}

/// Central registry for backends.
#[derive(Default)]
pub struct BackendRegistry {
    backends: FxHashMap<String, Registered>,
}

impl BackendRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend constructor under `name`.
    ///
    /// Fails with [`HalError::DuplicateBackend`] when the name is taken,
    /// whichever namespace registered it first.
    pub fn register_factory(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        factory: impl Fn() -> HalResult<Box<dyn Backend>> + Send + Sync + 'static,
    ) -> HalResult<()> {
        let name = name.into();
        let namespace = namespace.into();
        if let Some(existing) = self.backends.get(&name) {
            return Err(HalError::DuplicateBackend(format!(
                "{name} (from {namespace}, already provided by {})",
                existing.namespace
            )));
        }

        debug!("Registering backend {}::{}", namespace, name);
        self.backends.insert(
            name,
            Registered {
                namespace,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Create a backend by name.
    pub fn create(&self, name: &str) -> HalResult<Box<dyn Backend>> {
        match self.backends.get(name) {
            Some(registered) => (registered.factory)(),
            None => Err(HalError::BackendNotFound(name.to_string())),
        }
    }

    /// List all backend names, sorted.
    pub fn available_backends(&self) -> Vec<String> {
        let mut names: Vec<_> = self.backends.keys().cloned().collect();
        names.sort();
        names
    }

    /// Names with their namespaces, sorted by namespace then name.
    pub fn entries(&self) -> Vec<BackendEntry> {
        let mut entries: Vec<_> = self
            .backends
            .iter()
            .map(|(name, registered)| BackendEntry {
                name: name.clone(),
                namespace: registered.namespace.clone(),
            })
            .collect();
        entries.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        entries
    }

    /// Check if a backend is available by name.
    pub fn has_backend(&self, name: &str) -> bool {
        self.backends.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl std::fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.available_backends())
            .finish()
    }
}
