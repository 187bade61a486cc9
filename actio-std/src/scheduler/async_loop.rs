//! A scheduler drained by a future.
//!
//! Runtime agnostic: the designated context is whichever task awaits
//! [`SchedulerLoop::run`].

use super::run_task;
use actio_core::{Scheduler, Task};
use futures::{
    StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded},
};
use std::fmt;

/// Sending half; queue tasks from any thread.
#[derive(Clone)]
pub struct AsyncScheduler {
    sender: UnboundedSender<Task>,
}

/// Receiving half; runs queued tasks when awaited.
pub struct SchedulerLoop {
    receiver: UnboundedReceiver<Task>,
}

impl AsyncScheduler {
    /// Creates a connected scheduler and loop.
    pub fn channel() -> (Self, SchedulerLoop) {
        let (sender, receiver) = unbounded();
        (Self { sender }, SchedulerLoop { receiver })
    }

    /// Closes the channel for every clone. The loop ends after draining what
    /// was already queued.
    pub fn close(&self) {
        self.sender.close_channel();
    }

    /// Whether the loop side is gone or the channel was closed.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

impl Scheduler for AsyncScheduler {
    fn schedule(&self, task: Task) {
        if self.sender.unbounded_send(task).is_err() {
            tracing::warn!("scheduler loop has stopped; task dropped");
        }
    }
}

impl SchedulerLoop {
    /// Runs tasks as they arrive until every sender is dropped or the channel
    /// is closed. Returns the number of tasks run.
    pub async fn run(mut self) -> usize {
        let mut executed = 0;
        while let Some(task) = self.receiver.next().await {
            run_task(task);
            executed += 1;
        }
        tracing::debug!(executed, "scheduler loop finished");
        executed
    }
}

impl fmt::Debug for AsyncScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncScheduler")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl fmt::Debug for SchedulerLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchedulerLoop").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn drains_then_stops_on_close() {
        let (scheduler, run_loop) = AsyncScheduler::channel();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let seen = Arc::clone(&seen);
            scheduler.schedule(Box::new(move || seen.lock().unwrap().push(i)));
        }
        scheduler.schedule(Box::new(|| panic!("contained")));
        scheduler.close();

        assert_eq!(run_loop.run().await, 4);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert!(scheduler.is_closed());
    }

    #[tokio::test]
    async fn runs_tasks_sent_from_other_threads() {
        let (scheduler, run_loop) = AsyncScheduler::channel();
        let handle = tokio::spawn(run_loop.run());

        let remote = scheduler.clone();
        let (tx, rx) = tokio::sync::oneshot::channel();
        std::thread::spawn(move || {
            remote.schedule(Box::new(move || {
                let _ = tx.send(42);
            }));
        });

        assert_eq!(rx.await.unwrap(), 42);
        drop(scheduler);
        assert_eq!(handle.await.unwrap(), 1);
    }
}
