//! A scheduler pumped by the host.

use super::run_task;
use actio_core::{Scheduler, Task};
use parking_lot::{Condvar, Mutex};
use std::{
    collections::VecDeque,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

#[derive(Default)]
struct Queue {
    tasks: Mutex<VecDeque<Task>>,
    ready: Condvar,
}

/// Queues tasks until the designated thread pumps them.
///
/// The designated context is whichever thread calls [`run_pending`] or
/// [`run_until`]; a host event loop calls one of them every turn. Clones share
/// the queue.
///
/// [`run_pending`]: Self::run_pending
/// [`run_until`]: Self::run_until
#[derive(Clone, Default)]
pub struct QueueScheduler {
    queue: Arc<Queue>,
}

impl QueueScheduler {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.tasks.lock().len()
    }

    /// Runs queued tasks in order until the queue is empty, including tasks
    /// queued while running. Returns how many ran.
    pub fn run_pending(&self) -> usize {
        let mut executed = 0;
        loop {
            let next = self.queue.tasks.lock().pop_front();
            match next {
                Some(task) => {
                    run_task(task);
                    executed += 1;
                }
                None => return executed,
            }
        }
    }

    /// Pumps the queue until `done` returns true or `timeout` elapses.
    ///
    /// Returns whether `done` was satisfied.
    pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.run_pending();
            if done() {
                return true;
            }
            let mut tasks = self.queue.tasks.lock();
            if tasks.is_empty() {
                // wake periodically: `done` may depend on state outside the queue
                let wake = (Instant::now() + Duration::from_millis(10)).min(deadline);
                self.queue.ready.wait_until(&mut tasks, wake);
            }
            drop(tasks);
            if Instant::now() >= deadline {
                self.run_pending();
                return done();
            }
        }
    }
}

impl Scheduler for QueueScheduler {
    fn schedule(&self, task: Task) {
        self.queue.tasks.lock().push_back(task);
        self.queue.ready.notify_all();
    }
}

impl fmt::Debug for QueueScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueueScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
