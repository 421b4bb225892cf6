//! Host-owned container binding.
//!
//! # Responsibility
//! - Correlate one controller with one host-owned node through a token.
//! - Track the live occupant so a container never hosts two children.
//!
//! # Invariants
//! - The token is generated when the binding is created and never reused.
//! - Claiming a binding releases the previous live occupant first.
//! - A released binding no longer resolves to a node.

use crate::contract::handle::Renderable;
use log::{info, warn};
use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Unique identity of one container binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerToken(Uuid);

impl ContainerToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for ContainerToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "spa-{}", self.0)
    }
}

/// Host-owned node a child attaches itself to.
#[derive(Debug)]
pub struct ContainerNode {
    token: ContainerToken,
    content: RefCell<Option<Renderable>>,
}

impl ContainerNode {
    pub fn token(&self) -> ContainerToken {
        self.token
    }

    /// Replaces whatever the child previously wrote into the node.
    pub fn set_content(&self, content: impl Into<Renderable>) {
        *self.content.borrow_mut() = Some(content.into());
    }

    pub fn clear(&self) {
        self.content.borrow_mut().take();
    }

    pub fn content(&self) -> Option<Renderable> {
        self.content.borrow().clone()
    }
}

/// Shared reference to a container node, handed to child factories.
pub type ContainerRef = Rc<ContainerNode>;

/// Something occupying a container that can be told to let go of it.
pub(crate) trait Occupant {
    fn is_live(&self) -> bool;
    fn release(&self);
}

struct OccupantSlot {
    id: Uuid,
    occupant: Weak<dyn Occupant>,
}

struct BindingInner {
    token: ContainerToken,
    node: RefCell<Option<ContainerRef>>,
    occupant: RefCell<Option<OccupantSlot>>,
}

/// Attachment point created and destroyed by the host.
///
/// Clones share the same node and occupancy record.
#[derive(Clone)]
pub struct ContainerBinding {
    inner: Rc<BindingInner>,
}

impl ContainerBinding {
    pub fn new() -> Self {
        let token = ContainerToken::generate();
        Self {
            inner: Rc::new(BindingInner {
                token,
                node: RefCell::new(Some(Rc::new(ContainerNode {
                    token,
                    content: RefCell::new(None),
                }))),
                occupant: RefCell::new(None),
            }),
        }
    }

    pub fn token(&self) -> ContainerToken {
        self.inner.token
    }

    /// Resolves the host node, or `None` after the host destroyed it.
    pub fn node(&self) -> Option<ContainerRef> {
        self.inner.node.borrow().clone()
    }

    pub fn is_released(&self) -> bool {
        self.inner.node.borrow().is_none()
    }

    pub fn has_live_occupant(&self) -> bool {
        self.live_occupant().is_some()
    }

    /// Host destroyed the node: release the occupant, then drop the node.
    pub fn release(&self) {
        if let Some(previous) = self.live_occupant() {
            previous.release();
        }
        self.inner.occupant.borrow_mut().take();
        if self.inner.node.borrow_mut().take().is_some() {
            info!(
                "event=container_release module=container status=ok token={}",
                self.inner.token
            );
        }
    }

    /// Makes `occupant` (identified by `id`) the only live child here.
    pub(crate) fn claim(&self, id: Uuid, occupant: Weak<dyn Occupant>) {
        if let Some(previous) = self.live_occupant() {
            warn!(
                "event=container_claim module=container status=ok token={} previous=released",
                self.inner.token
            );
            previous.release();
        }
        *self.inner.occupant.borrow_mut() = Some(OccupantSlot { id, occupant });
    }

    /// Clears occupancy if `id` is still the recorded occupant.
    pub(crate) fn vacate(&self, id: Uuid) {
        let mut slot = self.inner.occupant.borrow_mut();
        if slot.as_ref().is_some_and(|current| current.id == id) {
            slot.take();
        }
    }

    fn live_occupant(&self) -> Option<Rc<dyn Occupant>> {
        let current = self.inner.occupant.borrow().as_ref()?.occupant.upgrade()?;
        current.is_live().then_some(current)
    }
}

impl Default for ContainerBinding {
    fn default() -> Self {
        Self::new()
    }
}
