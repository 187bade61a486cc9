//! A scheduler owning its designated thread.

use super::run_task;
use actio_core::{Scheduler, Task};
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use std::{
    fmt, io,
    thread::{self, JoinHandle, ThreadId},
};

enum Message {
    Run(Task),
    Stop,
}

/// Runs scheduled tasks one by one on a dedicated thread.
///
/// The thread lives until [`shutdown`](Self::shutdown) or drop. Tasks queued
/// before the stop request still run; tasks scheduled afterwards are dropped.
pub struct LooperScheduler {
    sender: Sender<Message>,
    thread_id: ThreadId,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl LooperScheduler {
    /// Starts the loop thread under `name`.
    pub fn spawn(name: impl Into<String>) -> io::Result<Self> {
        let name = name.into();
        let (sender, receiver) = unbounded();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(name, receiver))?;

        Ok(Self {
            sender,
            thread_id: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Id of the designated thread.
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the caller runs on the designated thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Stops the loop after the queued tasks and waits for it to end.
    ///
    /// Called from the loop thread itself, only the stop is requested.
    pub fn shutdown(&self) {
        let _ = self.sender.send(Message::Stop);
        if self.is_current() {
            return;
        }
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                tracing::error!("looper thread panicked");
            }
        }
    }
}

fn run_loop(name: String, receiver: Receiver<Message>) {
    tracing::debug!(looper = %name, "looper started");
    let mut executed = 0_usize;
    while let Ok(Message::Run(task)) = receiver.recv() {
        run_task(task);
        executed += 1;
    }
    tracing::debug!(looper = %name, executed, "looper stopped");
}

impl Scheduler for LooperScheduler {
    fn schedule(&self, task: Task) {
        if self.sender.send(Message::Run(task)).is_err() {
            tracing::warn!("looper has stopped; task dropped");
        }
    }
}

impl Drop for LooperScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for LooperScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LooperScheduler")
            .field("thread_id", &self.thread_id)
            .field("queued", &self.sender.len())
            .finish()
    }
}
