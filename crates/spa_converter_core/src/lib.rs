//! Micro-frontend loader core.
//!
//! Fetches an independently built child module by entry descriptor,
//! validates its lifecycle contract and drives mount/render/unmount inside a
//! host-owned container. All operations run on the host UI thread.

pub mod config;
pub mod container;
pub mod contract;
pub mod entry;
pub mod host;
pub mod lifecycle;
pub mod logging;

pub use config::{BuildMode, ConfigError, LoaderConfig};
pub use container::{ContainerBinding, ContainerNode, ContainerRef, ContainerToken};
pub use contract::define::{define_plain_spa_app, define_spa_app, SpaModuleBuilder};
pub use contract::handle::{
    ChildError, LifecycleCapabilities, LifecycleHandle, LifecycleHandleBuilder, Payload,
    Renderable,
};
pub use contract::module::{LoadedModule, ModuleExport, ModuleFactory, DEFAULT_EXPORT};
pub use contract::validator::{validate, ContractError};
pub use entry::descriptor::{EntryDescriptor, EntryProducer};
pub use entry::loader::{LoadError, ModuleLoader, ModuleRegistryError, StaticModuleLoader};
pub use entry::resolver::{ModuleResolver, ResolveError};
pub use host::converter::{ConverterProps, ErrorDisplay, FallbackTexts, SpaConverter};
pub use host::view::{ContainerView, ViewKind};
pub use lifecycle::controller::{LifecycleController, RenderOutcome};
pub use lifecycle::state::{ChildInstanceState, ErrorPayload, FailureStage};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
