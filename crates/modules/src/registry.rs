//! The module registry.

use latticebft_types::ModuleId;
use std::collections::HashMap;

use crate::error::RegistryError;
use crate::module::Module;

/// The set of modules hosted by a node.
///
/// Assembled before node construction; entries are immutable afterwards.
/// Registration rejects duplicate and empty IDs.
#[derive(Default, Debug)]
pub struct Modules {
    inner: HashMap<ModuleId, Module>,
}

impl Modules {
    /// Create an empty module set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module under `id`, returning the extended set.
    pub fn register(
        mut self,
        id: impl Into<ModuleId>,
        module: Module,
    ) -> Result<Self, RegistryError> {
        let id = id.into();
        if id.is_empty() {
            return Err(RegistryError::EmptyModuleId);
        }
        if self.inner.contains_key(&id) {
            return Err(RegistryError::DuplicateModule { module: id });
        }
        self.inner.insert(id, module);
        Ok(self)
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether a module is registered under `id`.
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.inner.contains_key(id)
    }

    /// Iterate over the registered module IDs.
    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.inner.keys()
    }
}

impl IntoIterator for Modules {
    type Item = (ModuleId, Module);
    type IntoIter = std::collections::hash_map::IntoIter<ModuleId, Module>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}
