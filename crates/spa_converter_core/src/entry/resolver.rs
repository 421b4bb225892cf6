//! Entry resolution: descriptor in, loaded module out.
//!
//! # Responsibility
//! - Drive a producer (when present) to a literal address.
//! - Hand the address to the configured [`ModuleLoader`].
//!
//! # Invariants
//! - Malformed descriptors fail before any load attempt.
//! - A failing producer means no load attempt.
//! - No caching; every call re-resolves.

use crate::contract::module::LoadedModule;
use crate::entry::descriptor::EntryDescriptor;
use crate::entry::loader::{LoadError, ModuleLoader};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Resolution failure for one mount attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The descriptor is neither a string address nor a producer.
    EntryTypeMismatch(&'static str),
    /// The descriptor (or producer output) is a blank address.
    BlankAddress,
    /// The producer rejected.
    Producer(String),
    /// The loader could not fetch the address.
    Load(LoadError),
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryTypeMismatch(found) => write!(
                f,
                "type error: entry path of spa has the wrong type: got {found}"
            ),
            Self::BlankAddress => write!(f, "type error: entry path of spa is blank"),
            Self::Producer(message) => write!(f, "entry producer failed: {message}"),
            Self::Load(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<LoadError> for ResolveError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

/// Resolves entry descriptors through one loader.
#[derive(Clone)]
pub struct ModuleResolver {
    loader: Rc<dyn ModuleLoader>,
}

impl ModuleResolver {
    pub fn new(loader: Rc<dyn ModuleLoader>) -> Self {
        Self { loader }
    }

    /// Resolves `entry` into a freshly loaded module.
    pub async fn resolve(&self, entry: EntryDescriptor) -> Result<LoadedModule, ResolveError> {
        let address = match entry {
            EntryDescriptor::Literal(address) => address,
            EntryDescriptor::Producer(produce) => produce().await.map_err(|message| {
                warn!("event=entry_produce module=resolver status=error");
                ResolveError::Producer(message)
            })?,
        };

        let address = address.trim();
        if address.is_empty() {
            return Err(ResolveError::BlankAddress);
        }

        debug!("event=entry_resolve module=resolver status=ok address={address}");
        Ok(self.loader.load(address).await?)
    }
}
