//! # actio
//!
//! Turn callback interfaces into three-phase actions.
//!
//! An [`Action`] builds one interception object per binding. The object
//! implements every callback interface the binding registers, and each call
//! on it runs through three phases:
//!
//! 1. `prepare`, synchronously on the calling thread; its reply becomes the
//!    intercepted method's return value
//! 2. `do_work`, on a thread of its own
//! 3. `after_work`, on the host's designated context ([`Scheduler`])
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use actio::prelude::*;
//!
//! #[actio::interface]
//! pub trait Clickable: Send + Sync {
//!     fn on_click(&self, x: i32, y: i32) -> bool;
//! }
//!
//! struct Save;
//!
//! impl ActionHandler for Save {
//!     type Tag1 = ();
//!     type Tag2 = ();
//!     type Output = usize;
//!
//!     fn prepare(&self, _call: &Call, _tags: &Tags<(), ()>) -> Option<Reply> {
//!         Some(Reply::new(true))
//!     }
//!
//!     fn do_work(&self, _call: &Call, _tags: &Tags<(), ()>, _cancel: &CancelToken) -> Result<usize, BoxError> {
//!         Ok(write_document()?)
//!     }
//!
//!     fn after_work(&self, _call: &Call, written: WorkResult<usize>, _tags: &Tags<(), ()>) {
//!         show_status(written);
//!     }
//! }
//!
//! let looper = Arc::new(LooperScheduler::spawn("ui")?);
//! let action = Action::new(Save, Tags::empty(), looper.clone());
//! ActionBuilder::new()
//!     .with([save_button])
//!     .reg::<dyn Clickable>("set_on_click")
//!     .pack(&action)?;
//! ```

#![deny(clippy::pub_use, clippy::wildcard_imports)]
#![warn(missing_docs)]

#[allow(clippy::pub_use)]
pub use actio_core::{
    // Handler
    ActionHandler,
    // Errors
    ActionError,
    AttachError,
    // Bindings
    Binding,
    BoxError,
    // Interception
    Call,
    CancelToken,
    Dispatch,
    ExtraTags,
    // Interfaces
    GenericInvoke,
    InterceptionObject,
    Interface,
    InterfaceType,
    // Values
    MethodArgs,
    // Host capabilities
    NoTarget,
    ObjectId,
    Proxy,
    Registration,
    Reply,
    Scheduler,
    Tags,
    Target,
    Task,
    Value,
    WorkError,
    WorkResult,
    args,
    panic_message,
};

#[allow(clippy::pub_use)]
pub use actio_std::{Action, ActionBuilder, ActionConfig, WorkRecord};

/// Schedulers for the designated context.
pub mod scheduler {
    #![allow(clippy::pub_use)]

    pub use actio_std::scheduler::{LooperScheduler, QueueScheduler};

    #[cfg(feature = "async")]
    pub use actio_std::scheduler::{AsyncScheduler, SchedulerLoop};
}

#[allow(clippy::pub_use)]
pub use scheduler::{LooperScheduler, QueueScheduler};

#[cfg(feature = "async")]
#[allow(clippy::pub_use)]
pub use scheduler::{AsyncScheduler, SchedulerLoop};

/// Testing utilities.
pub mod testing {
    #![allow(clippy::pub_use)]

    pub use actio_std::testing::{
        Attachment, Phase, PhaseEvent, RecordingHandler, RecordingTarget,
    };
}

/// Prelude module - common imports for actio.
///
/// # Usage
///
/// ```rust,ignore
/// use actio::prelude::*;
/// ```
pub mod prelude {
    #![allow(clippy::pub_use)]

    pub use crate::{
        Action, ActionBuilder, ActionError, ActionHandler, BoxError, Call, CancelToken,
        GenericInvoke, Interface, LooperScheduler, MethodArgs, Proxy, QueueScheduler,
        Registration, Reply, Scheduler, Tags, Target, WorkResult,
    };
}

#[cfg(feature = "macros")]
#[allow(clippy::pub_use)]
pub use actio_macros::interface;
