//! Lifecycle controller for one child instance in one container.
//!
//! # Responsibility
//! - Run the resolve-then-validate pipeline for one mount attempt.
//! - Drive `mount` / `render` / `unmount` on the accepted handle.
//! - Keep teardown ordering and idempotence independent of host effects.
//!
//! # Invariants
//! - `attach` starts at most one pipeline per controller.
//! - `mount` runs at most once, and never after teardown was requested.
//! - `unmount` runs at most once, and only for a handle that passed validation.
//! - A pipeline settling after teardown unmounts its handle and leaves the
//!   visible state untouched.
//! - The handle is stored before `mount` runs; teardown requested from inside
//!   `mount` unmounts once `mount` has returned.
//! - Resolution and contract failures become `ChildInstanceState::Error`;
//!   they never propagate to the host.

use crate::container::{ContainerBinding, ContainerToken, Occupant};
use crate::contract::handle::{ChildError, LifecycleHandle, Payload, Renderable};
use crate::contract::validator::validate;
use crate::entry::descriptor::EntryDescriptor;
use crate::entry::resolver::{ModuleResolver, ResolveError};
use crate::lifecycle::state::{ChildInstanceState, ErrorPayload, FailureStage};
use crate::logging::sanitize_message;
use futures::future::{self, FutureExt, LocalBoxFuture};
use log::{error, info, warn};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use uuid::Uuid;

const MAX_LOGGED_ERROR_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Attaching,
    Mounting,
    Settled,
    Detached,
}

/// Result of asking the controller for the child's render output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The pipeline has not settled yet.
    Pending,
    /// The child rendered; `None` means it returned nothing.
    Rendered(Option<Renderable>),
    /// The child is ready but has no `render` slot.
    NoRenderCapability,
    /// The attempt failed, or `render` itself failed.
    Failed(ErrorPayload),
    /// Teardown was requested; nothing may reach the host any more.
    Detached,
}

struct ControllerCore {
    attempt: Uuid,
    binding: ContainerBinding,
    resolver: ModuleResolver,
    payload: Payload,
    state: RefCell<ChildInstanceState>,
    handle: RefCell<Option<Rc<LifecycleHandle>>>,
    phase: Cell<Phase>,
}

impl ControllerCore {
    async fn run(self: Rc<Self>, entry: Result<EntryDescriptor, ResolveError>) {
        let outcome = self.load_handle(entry).await;
        self.settle(outcome);
    }

    async fn load_handle(
        &self,
        entry: Result<EntryDescriptor, ResolveError>,
    ) -> Result<LifecycleHandle, ErrorPayload> {
        let module = self.resolver.resolve(entry?).await?;
        let container = self.binding.node();
        Ok(validate(module, container.as_ref())?)
    }

    fn settle(&self, outcome: Result<LifecycleHandle, ErrorPayload>) {
        if self.phase.get() == Phase::Detached {
            match outcome {
                Ok(handle) => self.unmount_stale(&handle),
                Err(payload) => info!(
                    "event=child_settle module=lifecycle status=error token={} attempt={} stale=true stage={}",
                    self.binding.token(),
                    self.attempt,
                    payload.stage().as_str()
                ),
            }
            return;
        }

        let handle = match outcome {
            Ok(handle) => handle,
            Err(payload) => {
                error!(
                    "event=child_settle module=lifecycle status=error token={} attempt={} stage={} message={}",
                    self.binding.token(),
                    self.attempt,
                    payload.stage().as_str(),
                    sanitize_message(payload.message(), MAX_LOGGED_ERROR_CHARS)
                );
                *self.state.borrow_mut() = ChildInstanceState::Error(payload);
                self.phase.set(Phase::Settled);
                return;
            }
        };

        *self.state.borrow_mut() = ChildInstanceState::Ready;
        self.phase.set(Phase::Mounting);
        let handle = Rc::new(handle);
        *self.handle.borrow_mut() = Some(Rc::clone(&handle));
        let caps = handle.capabilities();
        info!(
            "event=child_settle module=lifecycle status=ok token={} attempt={} mount={} render={} unmount={}",
            self.binding.token(),
            self.attempt,
            caps.mount,
            caps.render,
            caps.unmount
        );

        if let Some(result) = handle.call_mount(&self.payload) {
            match result {
                Ok(()) => info!(
                    "event=child_mount module=lifecycle status=ok token={} attempt={}",
                    self.binding.token(),
                    self.attempt
                ),
                Err(err) => self.record_child_error(FailureStage::Mount, &err),
            }
        }

        // Teardown requested from inside `mount` is finished here.
        if self.phase.get() == Phase::Detached {
            self.handle.borrow_mut().take();
            self.unmount_stale(&handle);
            return;
        }
        self.phase.set(Phase::Settled);
    }

    fn unmount_stale(&self, handle: &LifecycleHandle) {
        let result = handle.call_unmount();
        info!(
            "event=child_stale_unmount module=lifecycle status={} token={} attempt={} unmount={}",
            if matches!(result, Some(Err(_))) { "error" } else { "ok" },
            self.binding.token(),
            self.attempt,
            result.is_some()
        );
    }

    fn teardown(&self) -> Result<(), ChildError> {
        let previous = self.phase.replace(Phase::Detached);
        if previous == Phase::Detached {
            return Ok(());
        }
        self.binding.vacate(self.attempt);
        if previous == Phase::Mounting {
            info!(
                "event=child_detach module=lifecycle status=deferred token={} attempt={}",
                self.binding.token(),
                self.attempt
            );
            return Ok(());
        }

        let handle = self.handle.borrow_mut().take();
        let Some(result) = handle.as_ref().and_then(|handle| handle.call_unmount()) else {
            info!(
                "event=child_detach module=lifecycle status=ok token={} attempt={} phase={:?} unmount=false",
                self.binding.token(),
                self.attempt,
                previous
            );
            return Ok(());
        };

        match result {
            Ok(()) => {
                info!(
                    "event=child_unmount module=lifecycle status=ok token={} attempt={}",
                    self.binding.token(),
                    self.attempt
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=child_unmount module=lifecycle status=error token={} attempt={} message={}",
                    self.binding.token(),
                    self.attempt,
                    sanitize_message(err.message(), MAX_LOGGED_ERROR_CHARS)
                );
                Err(err)
            }
        }
    }

    fn record_child_error(&self, stage: FailureStage, err: &ChildError) {
        error!(
            "event=child_{} module=lifecycle status=error token={} attempt={} message={}",
            stage.as_str(),
            self.binding.token(),
            self.attempt,
            sanitize_message(err.message(), MAX_LOGGED_ERROR_CHARS)
        );
        *self.state.borrow_mut() = ChildInstanceState::Error(ErrorPayload::from_child(stage, err));
    }
}

impl Occupant for ControllerCore {
    fn is_live(&self) -> bool {
        self.phase.get() != Phase::Detached
    }

    fn release(&self) {
        // Errors are already logged by teardown.
        let _ = self.teardown();
    }
}

/// Drives one child's attach/detach lifecycle against one container.
///
/// A controller serves a single mount attempt. Remounting means building a
/// new controller, possibly on the same [`ContainerBinding`]; the binding
/// detaches the previous occupant before the new one claims it.
///
/// Dropping the controller performs teardown if the host has not.
pub struct LifecycleController {
    core: Rc<ControllerCore>,
}

impl LifecycleController {
    pub fn new(binding: ContainerBinding, resolver: ModuleResolver, payload: Payload) -> Self {
        Self {
            core: Rc::new(ControllerCore {
                attempt: Uuid::new_v4(),
                binding,
                resolver,
                payload,
                state: RefCell::new(ChildInstanceState::Loading),
                handle: RefCell::new(None),
                phase: Cell::new(Phase::Idle),
            }),
        }
    }

    pub fn token(&self) -> ContainerToken {
        self.core.binding.token()
    }

    /// Identifier of this mount attempt, used to correlate log events.
    pub fn attempt_id(&self) -> Uuid {
        self.core.attempt
    }

    pub fn state(&self) -> ChildInstanceState {
        self.core.state.borrow().clone()
    }

    pub fn is_detached(&self) -> bool {
        self.core.phase.get() == Phase::Detached
    }

    /// Whether the pipeline has finished (successfully or not).
    pub fn is_settled(&self) -> bool {
        self.core.phase.get() == Phase::Settled
    }

    /// Claims the container and returns the resolve/validate/mount pipeline.
    ///
    /// The host drives the returned future on its UI-thread executor. Calls
    /// after the first one (or after `detach`) return a no-op future.
    pub fn attach(&self, entry: EntryDescriptor) -> LocalBoxFuture<'static, ()> {
        self.attach_entry(Ok(entry))
    }

    /// A malformed entry settles into the error state without a load.
    pub(crate) fn attach_entry(
        &self,
        entry: Result<EntryDescriptor, ResolveError>,
    ) -> LocalBoxFuture<'static, ()> {
        let core = Rc::clone(&self.core);
        if core.phase.get() != Phase::Idle {
            warn!(
                "event=child_attach module=lifecycle status=skipped token={} attempt={} phase={:?}",
                core.binding.token(),
                core.attempt,
                core.phase.get()
            );
            return future::ready(()).boxed_local();
        }

        core.phase.set(Phase::Attaching);
        let occupant: Weak<ControllerCore> = Rc::downgrade(&core);
        core.binding.claim(core.attempt, occupant);
        info!(
            "event=child_attach module=lifecycle status=ok token={} attempt={} entry={}",
            core.binding.token(),
            core.attempt,
            entry.as_ref().map_or("malformed", EntryDescriptor::kind)
        );
        core.run(entry).boxed_local()
    }

    /// Tears the child down; safe to call any number of times.
    ///
    /// Runs `unmount` synchronously when a stored handle has one. A failing
    /// `unmount` still completes teardown and is returned to the caller.
    pub fn detach(&self) -> Result<(), ChildError> {
        self.core.teardown()
    }

    /// Asks the child for its current render output.
    ///
    /// Output is passed through untouched. A failing `render` moves the
    /// controller into the error state.
    pub fn render(&self) -> RenderOutcome {
        if self.is_detached() {
            return RenderOutcome::Detached;
        }
        match &*self.core.state.borrow() {
            ChildInstanceState::Loading => return RenderOutcome::Pending,
            ChildInstanceState::Error(payload) => return RenderOutcome::Failed(payload.clone()),
            ChildInstanceState::Ready => {}
        }

        let Some(handle) = self.core.handle.borrow().clone() else {
            return RenderOutcome::Pending;
        };
        match handle.call_render(&self.core.payload) {
            None => RenderOutcome::NoRenderCapability,
            Some(Ok(output)) => RenderOutcome::Rendered(output),
            Some(Err(err)) => {
                self.core.record_child_error(FailureStage::Render, &err);
                RenderOutcome::Failed(ErrorPayload::from_child(FailureStage::Render, &err))
            }
        }
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        // Errors are already logged by teardown.
        let _ = self.core.teardown();
    }
}
