//! Work phase execution and bookkeeping.
//!
//! Every accepted call gets its own thread; nothing is pooled. The thread
//! checks its [`CancelToken`] before running the work and again before
//! delivering the result to the after-work phase.

use crate::action::{Shared, SharedTags};
use actio_core::{
    ActionHandler, Call, CancelToken, MethodArgs, Target, Task, WorkError, WorkResult,
    panic_message,
};
use dashmap::DashMap;
use std::{
    io,
    panic::{self, AssertUnwindSafe},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    thread,
    time::Instant,
};

/// One in-flight work phase.
#[derive(Clone, Debug)]
pub struct WorkRecord {
    id: u64,
    method: &'static str,
    args: MethodArgs,
    token: CancelToken,
    started_at: Instant,
}

impl WorkRecord {
    /// Id, unique within its action.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Intercepted method.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Arguments of the intercepted call.
    pub fn args(&self) -> &MethodArgs {
        &self.args
    }

    /// Whether the work may still deliver its result.
    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// When the record was created.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// Concurrent set of work records, written from work threads and the owner.
#[derive(Default)]
pub(crate) struct WorkSet {
    records: DashMap<u64, WorkRecord>,
    next_id: AtomicU64,
}

impl WorkSet {
    fn track(&self, method: &'static str, args: MethodArgs) -> WorkRecord {
        let record = WorkRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
            method,
            args,
            token: CancelToken::new(),
            started_at: Instant::now(),
        };
        self.records.insert(record.id, record.clone());
        record
    }

    fn retire(&self, id: u64) {
        self.records.remove(&id);
    }

    pub(crate) fn cancel_all(&self) -> usize {
        let mut cancelled = 0;
        for record in self.records.iter() {
            record.token.cancel();
            cancelled += 1;
        }
        cancelled
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn snapshot(&self) -> Vec<WorkRecord> {
        let mut records: Vec<WorkRecord> = self.records.iter().map(|r| r.value().clone()).collect();
        records.sort_by_key(WorkRecord::id);
        records
    }
}

/// Tracks a record for `call` and starts its work thread.
pub(crate) fn spawn<H: ActionHandler, T: Target>(
    shared: Arc<Shared<H, T>>,
    call: Call,
    tags: SharedTags<H>,
    target: Option<T>,
) -> io::Result<()> {
    let record = shared.work.track(call.method(), call.args().clone());
    if shared.is_closed() {
        // cancel() may have swept the set before this record was inserted
        record.token.cancel();
    }

    let id = record.id;
    let method = call.method();
    let span = tracing::debug_span!("work", action = shared.id, work_id = id, method);
    let mut builder = thread::Builder::new().name(format!("{}-{}", shared.config.worker_name, id));
    if let Some(size) = shared.config.worker_stack_size {
        builder = builder.stack_size(size);
    }

    let worker = Arc::clone(&shared);
    let token = record.token;
    let spawned = builder.spawn(move || {
        let _entered = span.enter();
        run(worker, id, call, tags, target, token);
    });

    match spawned {
        Ok(_) => {
            tracing::debug!(action = shared.id, work_id = id, method, "work phase started");
            Ok(())
        }
        Err(err) => {
            shared.work.retire(id);
            Err(err)
        }
    }
}

fn run<H: ActionHandler, T: Target>(
    shared: Arc<Shared<H, T>>,
    id: u64,
    call: Call,
    tags: SharedTags<H>,
    target: Option<T>,
    token: CancelToken,
) {
    if token.is_cancelled() {
        tracing::debug!("cancelled before work");
        shared.work.retire(id);
        return;
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        shared.handler.do_work(&call, &tags, &token)
    }));
    let result: WorkResult<H::Output> = match outcome {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "work phase failed");
            Err(WorkError::Failed(err))
        }
        Err(payload) => {
            let err = WorkError::from_panic(payload);
            tracing::error!(error = %err, "work phase panicked");
            Err(err)
        }
    };

    if token.is_cancelled() {
        tracing::debug!("cancelled before delivery");
        shared.work.retire(id);
        return;
    }

    let task = after_work(Arc::clone(&shared), call, result, tags, token);
    match &target {
        Some(target) => target.post(task, shared.scheduler.as_ref()),
        None => shared.scheduler.schedule(task),
    }
    shared.work.retire(id);
    tracing::debug!("work phase retired");
}

fn after_work<H: ActionHandler, T: Target>(
    shared: Arc<Shared<H, T>>,
    call: Call,
    result: WorkResult<H::Output>,
    tags: SharedTags<H>,
    token: CancelToken,
) -> Task {
    let span = tracing::Span::current();
    Box::new(move || {
        let _entered = span.enter();
        if token.is_cancelled() {
            tracing::debug!("after-work suppressed by cancellation");
            return;
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            shared.handler.after_work(&call, result, &tags);
        }));
        if let Err(payload) = outcome {
            tracing::error!(
                error = %panic_message(payload.as_ref()),
                "after-work phase panicked"
            );
        }
    })
}
