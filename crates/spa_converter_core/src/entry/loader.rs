//! Module loading seam and the in-process loader.
//!
//! # Responsibility
//! - Define how an address becomes a [`LoadedModule`] (`ModuleLoader`).
//! - Provide an address-keyed registry loader for embedded children.
//!
//! # Invariants
//! - Loaders never cache: each `load` builds a fresh module.
//! - Registered addresses are validated and unique.

use crate::contract::module::LoadedModule;
use futures::future::{self, FutureExt, LocalBoxFuture};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

static MODULE_ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9@._~%+/\-][A-Za-z0-9@._~%+\-:/?#=&]*$").expect("valid address regex")
});

/// Returns whether `address` is usable as a module address.
pub fn is_valid_module_address(address: &str) -> bool {
    MODULE_ADDRESS_RE.is_match(address)
}

/// Failure to fetch one module address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    NotFound(String),
    Failed { address: String, reason: String },
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(address) => write!(f, "no module found at `{address}`"),
            Self::Failed { address, reason } => {
                write!(f, "failed to load module `{address}`: {reason}")
            }
        }
    }
}

impl Error for LoadError {}

/// Dynamic module load mechanism of the host environment.
pub trait ModuleLoader {
    fn load<'a>(&'a self, address: &'a str) -> LocalBoxFuture<'a, Result<LoadedModule, LoadError>>;
}

impl<L: ModuleLoader + ?Sized> ModuleLoader for Rc<L> {
    fn load<'a>(&'a self, address: &'a str) -> LocalBoxFuture<'a, Result<LoadedModule, LoadError>> {
        (**self).load(address)
    }
}

type ModuleConstructor = Rc<dyn Fn() -> Result<LoadedModule, String>>;

/// Registry errors for [`StaticModuleLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleRegistryError {
    InvalidAddress(String),
    DuplicateAddress(String),
}

impl Display for ModuleRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress(value) => write!(f, "module address is invalid: {value}"),
            Self::DuplicateAddress(value) => {
                write!(f, "module address already registered: {value}")
            }
        }
    }
}

impl Error for ModuleRegistryError {}

/// Loader backed by constructors registered per address.
#[derive(Default)]
pub struct StaticModuleLoader {
    modules: BTreeMap<String, ModuleConstructor>,
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor invoked on every load of `address`.
    pub fn register<F>(&mut self, address: &str, construct: F) -> Result<(), ModuleRegistryError>
    where
        F: Fn() -> LoadedModule + 'static,
    {
        self.insert(address, Rc::new(move || Ok(construct())))
    }

    /// Registers an address whose load always fails with `reason`.
    pub fn register_failure(
        &mut self,
        address: &str,
        reason: impl Into<String>,
    ) -> Result<(), ModuleRegistryError> {
        let reason = reason.into();
        self.insert(address, Rc::new(move || Err(reason.clone())))
    }

    /// Returns sorted registered addresses.
    pub fn addresses(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    fn insert(
        &mut self,
        address: &str,
        construct: ModuleConstructor,
    ) -> Result<(), ModuleRegistryError> {
        let address = address.trim().to_string();
        if !is_valid_module_address(&address) {
            return Err(ModuleRegistryError::InvalidAddress(address));
        }
        if self.modules.contains_key(address.as_str()) {
            return Err(ModuleRegistryError::DuplicateAddress(address));
        }
        self.modules.insert(address, construct);
        Ok(())
    }

    fn construct(&self, address: &str) -> Result<LoadedModule, LoadError> {
        let construct = self
            .modules
            .get(address)
            .ok_or_else(|| LoadError::NotFound(address.to_string()))?;
        debug!("event=module_load module=loader status=ok address={address}");
        construct().map_err(|reason| LoadError::Failed {
            address: address.to_string(),
            reason,
        })
    }
}

impl ModuleLoader for StaticModuleLoader {
    fn load<'a>(&'a self, address: &'a str) -> LocalBoxFuture<'a, Result<LoadedModule, LoadError>> {
        future::ready(self.construct(address)).boxed_local()
    }
}
