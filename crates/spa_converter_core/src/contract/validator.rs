//! Child module contract validation.
//!
//! # Responsibility
//! - Turn a loaded module into a lifecycle handle, or a typed rejection.
//!
//! # Invariants
//! - Checks short-circuit in a fixed order: export, target, methods, pairing.
//! - The factory is invoked at most once and only after the first two checks.
//! - No lifecycle slot of a rejected handle is ever invoked.
//! - An accepted handle is returned unchanged.

use crate::container::ContainerRef;
use crate::contract::handle::LifecycleHandle;
use crate::contract::module::{LoadedModule, DEFAULT_EXPORT};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Contract rule a child module broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractError {
    /// No `default` export, or the export is not a factory.
    MissingRequiredExport(&'static str),
    /// The container node was gone when validation ran.
    MissingMountTarget,
    /// The handle exposes neither `mount` nor `render`.
    NoUsableLifecycleMethod,
    /// The handle exposes `mount` without a matching `unmount`.
    UnmountMissingWhileMountPresent,
}

impl Display for ContractError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequiredExport(name) => write!(
                f,
                "missing required export `{name}`: expected a lifecycle factory"
            ),
            Self::MissingMountTarget => {
                write!(f, "missing mount target: container node does not exist")
            }
            Self::NoUsableLifecycleMethod => write!(
                f,
                "no usable lifecycle method: `mount` and `render` are both absent"
            ),
            Self::UnmountMissingWhileMountPresent => write!(
                f,
                "unmount missing while mount present: `unmount` is required when `mount` is set"
            ),
        }
    }
}

impl Error for ContractError {}

/// Validates `module` against the child contract for `container`.
///
/// The module is consumed; only the handle survives validation.
pub fn validate(
    module: LoadedModule,
    container: Option<&ContainerRef>,
) -> Result<LifecycleHandle, ContractError> {
    let factory = module
        .default_factory()
        .ok_or(ContractError::MissingRequiredExport(DEFAULT_EXPORT))?;
    let container = container.ok_or(ContractError::MissingMountTarget)?;

    let handle = factory(container);
    check_handle(&handle)?;
    Ok(handle)
}

/// Checks lifecycle slot rules on an already constructed handle.
pub fn check_handle(handle: &LifecycleHandle) -> Result<(), ContractError> {
    let caps = handle.capabilities();
    if !caps.mount && !caps.render {
        return Err(ContractError::NoUsableLifecycleMethod);
    }
    if caps.mount && !caps.unmount {
        return Err(ContractError::UnmountMissingWhileMountPresent);
    }
    Ok(())
}
