//! Scheduler implementations.
//!
//! A [`Scheduler`](actio_core::Scheduler) is the host's designated context:
//! the one place after-work phases run. Pick the one matching how the host
//! runs its event loop.
//!
//! - [`LooperScheduler`]: a dedicated thread draining a queue
//! - [`QueueScheduler`]: whichever thread pumps the queue
//! - `AsyncScheduler` (feature `async`): whichever task awaits the loop future

pub mod looper;
pub mod queue;

#[cfg(feature = "async")]
pub mod async_loop;

#[allow(clippy::pub_use)]
pub use looper::LooperScheduler;
#[allow(clippy::pub_use)]
pub use queue::QueueScheduler;

#[cfg(feature = "async")]
#[allow(clippy::pub_use)]
pub use async_loop::{AsyncScheduler, SchedulerLoop};

use actio_core::{Task, panic_message};
use std::panic::{self, AssertUnwindSafe};

/// Runs a task, containing any panic so the loop survives it.
pub(crate) fn run_task(task: Task) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
        tracing::error!(
            error = %panic_message(payload.as_ref()),
            "scheduled task panicked"
        );
    }
}
