//! Lifecycle handle produced by a child application.
//!
//! # Responsibility
//! - Hold the three optional lifecycle slots (`mount`, `render`, `unmount`).
//! - Offer a construct-once builder; a built handle has no setters.
//!
//! # Invariants
//! - Slots are fixed when `LifecycleHandleBuilder::build` returns.
//! - Calling an absent slot never panics; it reports `None`.

use serde_json::{Map, Value};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Key-value parameters forwarded verbatim from host to child ("deep props").
pub type Payload = Map<String, Value>;

type MountFn = Box<dyn Fn(&Payload) -> Result<(), ChildError>>;
type RenderFn = Box<dyn Fn(&Payload) -> Result<Option<Renderable>, ChildError>>;
type UnmountFn = Box<dyn Fn() -> Result<(), ChildError>>;

/// Opaque fragment shown inside a container.
///
/// The loader never inspects or rewrites the fragment text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Renderable(String);

impl Renderable {
    pub fn text(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Renderable {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Renderable {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for Renderable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure reported by a child's own lifecycle method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildError {
    message: String,
}

impl ChildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for ChildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "child lifecycle failure: {}", self.message)
    }
}

impl Error for ChildError {}

impl From<&str> for ChildError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ChildError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Which lifecycle slots a handle exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecycleCapabilities {
    pub mount: bool,
    pub render: bool,
    pub unmount: bool,
}

/// Lifecycle methods returned by a child module factory.
///
/// Built through [`LifecycleHandle::builder`]. Once built, the slots cannot be
/// replaced, so whatever the validator accepted is exactly what the
/// controller later invokes.
pub struct LifecycleHandle {
    mount: Option<MountFn>,
    render: Option<RenderFn>,
    unmount: Option<UnmountFn>,
}

impl LifecycleHandle {
    pub fn builder() -> LifecycleHandleBuilder {
        LifecycleHandleBuilder::default()
    }

    pub fn capabilities(&self) -> LifecycleCapabilities {
        LifecycleCapabilities {
            mount: self.mount.is_some(),
            render: self.render.is_some(),
            unmount: self.unmount.is_some(),
        }
    }

    pub fn has_mount(&self) -> bool {
        self.mount.is_some()
    }

    pub fn has_render(&self) -> bool {
        self.render.is_some()
    }

    pub fn has_unmount(&self) -> bool {
        self.unmount.is_some()
    }

    /// Invokes `mount`; `None` when the slot is absent.
    pub fn call_mount(&self, payload: &Payload) -> Option<Result<(), ChildError>> {
        self.mount.as_ref().map(|mount| mount(payload))
    }

    /// Invokes `render`; `None` when the slot is absent.
    pub fn call_render(&self, payload: &Payload) -> Option<Result<Option<Renderable>, ChildError>> {
        self.render.as_ref().map(|render| render(payload))
    }

    /// Invokes `unmount`; `None` when the slot is absent.
    pub fn call_unmount(&self) -> Option<Result<(), ChildError>> {
        self.unmount.as_ref().map(|unmount| unmount())
    }
}

impl Debug for LifecycleHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleHandle")
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// One-shot builder for [`LifecycleHandle`].
#[derive(Default)]
pub struct LifecycleHandleBuilder {
    mount: Option<MountFn>,
    render: Option<RenderFn>,
    unmount: Option<UnmountFn>,
}

impl LifecycleHandleBuilder {
    pub fn mount<F>(mut self, mount: F) -> Self
    where
        F: Fn(&Payload) -> Result<(), ChildError> + 'static,
    {
        self.mount = Some(Box::new(mount));
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Payload) -> Result<Option<Renderable>, ChildError> + 'static,
    {
        self.render = Some(Box::new(render));
        self
    }

    pub fn unmount<F>(mut self, unmount: F) -> Self
    where
        F: Fn() -> Result<(), ChildError> + 'static,
    {
        self.unmount = Some(Box::new(unmount));
        self
    }

    pub fn build(self) -> LifecycleHandle {
        LifecycleHandle {
            mount: self.mount,
            render: self.render,
            unmount: self.unmount,
        }
    }
}
