//! Loaded child module and its export table.

use crate::container::ContainerRef;
use crate::contract::handle::LifecycleHandle;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Name of the export every child module must provide.
pub const DEFAULT_EXPORT: &str = "default";

/// Factory export: builds the lifecycle handle for one container.
pub type ModuleFactory = Rc<dyn Fn(&ContainerRef) -> LifecycleHandle>;

/// One named export of a loaded module.
#[derive(Clone)]
pub enum ModuleExport {
    Factory(ModuleFactory),
    Value(Value),
}

impl ModuleExport {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Factory(_) => "factory",
            Self::Value(_) => "value",
        }
    }
}

impl Debug for ModuleExport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Factory(_) => f.write_str("Factory(..)"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

/// Raw unit produced by a module loader.
///
/// Held only while it is validated; the controller keeps the handle, never
/// the module.
#[derive(Debug, Clone, Default)]
pub struct LoadedModule {
    exports: BTreeMap<String, ModuleExport>,
}

impl LoadedModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module whose only export is the default factory.
    pub fn from_factory<F>(factory: F) -> Self
    where
        F: Fn(&ContainerRef) -> LifecycleHandle + 'static,
    {
        Self::from_shared_factory(Rc::new(factory))
    }

    pub fn from_shared_factory(factory: ModuleFactory) -> Self {
        let mut module = Self::new();
        module.insert_export(DEFAULT_EXPORT, ModuleExport::Factory(factory));
        module
    }

    pub fn insert_export(&mut self, name: impl Into<String>, export: ModuleExport) {
        self.exports.insert(name.into(), export);
    }

    pub fn export(&self, name: &str) -> Option<&ModuleExport> {
        self.exports.get(name)
    }

    pub fn export_names(&self) -> Vec<&str> {
        self.exports.keys().map(String::as_str).collect()
    }

    /// Returns the default export when it is a factory.
    pub fn default_factory(&self) -> Option<&ModuleFactory> {
        match self.exports.get(DEFAULT_EXPORT)? {
            ModuleExport::Factory(factory) => Some(factory),
            ModuleExport::Value(_) => None,
        }
    }
}
