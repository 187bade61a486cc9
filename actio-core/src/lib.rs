//! # actio-core
//!
//! Core types for the actio callback dispatcher.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! hosts and interface crates that don't need the dispatcher in `actio-std`.
//!
//! # Layers
//!
//! ## Interfaces ([`Interface`], [`Proxy`])
//!
//! A callback interface is an object-safe trait. Its descriptor names the
//! interface and its methods; its facade `Proxy<dyn I>` implements the trait
//! by forwarding every method to an interception object.
//!
//! ## Interception ([`InterceptionObject`], [`Dispatch`])
//!
//! One object per binding that "is" all of the binding's interfaces. Every
//! call, whatever interface it arrives on, reaches one entry point.
//!
//! ## Bindings ([`Registration`], [`Binding`])
//!
//! Which interfaces a target exposes, how each is attached to the target, and
//! which methods are dispatched.
//!
//! ## Phases ([`ActionHandler`])
//!
//! prepare on the calling thread, work on a dedicated thread, after-work on
//! the designated context.
//!
//! ## Host capabilities ([`Target`], [`Scheduler`])
//!
//! Attaching objects to host targets and running tasks on the designated
//! context are supplied by the host.
//!
//! # Error Types
//!
//! - [`ActionError`] - Registration, dispatch and lifecycle errors
//! - [`AttachError`] - Attachment failures reported by targets
//! - [`WorkError`] - Work phase failures delivered to the after-work phase

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod handler;
mod interface;
mod object;
mod registration;
mod target;
mod value;

// Re-exports
pub use error::{ActionError, AttachError, BoxError, WorkError, panic_message};
pub use handler::{ActionHandler, CancelToken, ExtraTags, Tags, WorkResult};
pub use interface::{GenericInvoke, Interface, InterfaceType, Proxy};
pub use object::{Call, Dispatch, InterceptionObject, ObjectId};
pub use registration::{Binding, Registration};
pub use target::{NoTarget, Scheduler, Target, Task};
pub use value::{MethodArgs, Reply, Value};
