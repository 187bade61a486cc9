//! Host capabilities: attaching interception objects and scheduling on the
//! designated context.

use crate::{error::AttachError, interface::InterfaceType, object::InterceptionObject};
use std::sync::Arc;

/// A unit of work handed to a [`Scheduler`].
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs tasks on the one designated execution context.
///
/// Implementations must run every task exactly once, in submission order
/// relative to other tasks submitted to the same instance.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Scheduler`",
    label = "missing `Scheduler` implementation",
    note = "A scheduler must run each task exactly once on its designated context."
)]
pub trait Scheduler: Send + Sync + 'static {
    /// Queues `task` for the designated context.
    fn schedule(&self, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task);
    }
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task);
    }
}

/// A host object an action attaches its interception object to.
///
/// `attach` is the host's "call method `method` on this target with the
/// interception object" capability. `post` lets a target route after-work
/// tasks through its own context affinity; by default it uses the action's
/// scheduler.
pub trait Target: Clone + Send + Sync + 'static {
    /// Hands `object` to this target through its method `method`.
    fn attach(
        &self,
        method: &str,
        interface: InterfaceType,
        object: &InterceptionObject,
    ) -> Result<(), AttachError>;

    /// Runs `task` on the designated context on behalf of this target.
    fn post(&self, task: Task, fallback: &dyn Scheduler) {
        fallback.schedule(task);
    }
}

/// Target type of actions whose bindings never have a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoTarget {}

impl Target for NoTarget {
    fn attach(
        &self,
        _method: &str,
        _interface: InterfaceType,
        _object: &InterceptionObject,
    ) -> Result<(), AttachError> {
        match *self {}
    }
}
