//! Testing utilities for actio.
//!
//! This module provides doubles for the two host-facing seams of an action.
//!
//! # Features
//!
//! - [`RecordingHandler`]: A handler that records every phase it runs
//! - [`RecordingTarget`]: A target that records attachments and posted tasks

use actio_core::{
    ActionHandler, AttachError, BoxError, Call, CancelToken, ExtraTags, InterceptionObject,
    InterfaceType, MethodArgs, Reply, Scheduler, Tags, Target, Task, WorkResult,
};
use parking_lot::{Condvar, Mutex};
use std::{
    collections::BTreeSet,
    fmt,
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, ThreadId},
    time::{Duration, Instant},
};

// ============================================================================
// Recording Handler
// ============================================================================

/// A pipeline phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// The synchronous phase on the calling thread.
    Prepare,
    /// The work phase on its own thread.
    Work,
    /// The after-work phase on the designated context.
    AfterWork,
}

/// One phase observed by a [`RecordingHandler`].
#[derive(Clone, Debug)]
pub struct PhaseEvent {
    /// Which phase ran.
    pub phase: Phase,
    /// Intercepted method.
    pub method: &'static str,
    /// Arguments of the intercepted call.
    pub args: MethodArgs,
    /// Thread the phase ran on.
    pub thread: ThreadId,
    /// The extra tags seen by the phase.
    pub extra: ExtraTags,
    /// For [`Phase::AfterWork`]: the work output, or the work error rendered
    /// as a string.
    pub result: Option<Result<String, String>>,
}

type PrepareFn = dyn Fn(&Call) -> Option<Reply> + Send + Sync;
type WorkFn = dyn Fn(&Call, &CancelToken) -> Result<String, BoxError> + Send + Sync;

#[derive(Default)]
struct Journal {
    events: Mutex<Vec<PhaseEvent>>,
    changed: Condvar,
}

/// A handler that records every phase it runs.
///
/// By default `prepare` returns no reply and the work phase yields
/// `"<method> done"`. Clones share the journal.
///
/// # Example
///
/// ```rust,ignore
/// let handler = RecordingHandler::new();
/// let journal = handler.clone();
/// let action = Action::new(handler, Tags::empty(), scheduler.clone());
///
/// // dispatch through a facade, then pump the scheduler...
/// assert!(journal.wait_for(Phase::AfterWork, 1, Duration::from_secs(1)));
/// ```
pub struct RecordingHandler<T1 = (), T2 = ()> {
    journal: Arc<Journal>,
    prepare: Option<Arc<PrepareFn>>,
    work: Option<Arc<WorkFn>>,
    _tags: PhantomData<fn() -> (T1, T2)>,
}

impl<T1, T2> RecordingHandler<T1, T2> {
    /// Create a handler with the default phase behavior.
    pub fn new() -> Self {
        Self {
            journal: Arc::default(),
            prepare: None,
            work: None,
            _tags: PhantomData,
        }
    }

    /// Replace what `prepare` returns.
    pub fn with_prepare(
        mut self,
        prepare: impl Fn(&Call) -> Option<Reply> + Send + Sync + 'static,
    ) -> Self {
        self.prepare = Some(Arc::new(prepare));
        self
    }

    /// Replace the work phase body.
    pub fn with_work(
        mut self,
        work: impl Fn(&Call, &CancelToken) -> Result<String, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.work = Some(Arc::new(work));
        self
    }

    /// Get a clone of the recorded events, in recording order.
    pub fn events(&self) -> Vec<PhaseEvent> {
        self.journal.events.lock().clone()
    }

    /// Recorded events of one phase.
    pub fn events_of(&self, phase: Phase) -> Vec<PhaseEvent> {
        self.journal
            .events
            .lock()
            .iter()
            .filter(|event| event.phase == phase)
            .cloned()
            .collect()
    }

    /// Number of times `phase` ran.
    pub fn count(&self, phase: Phase) -> usize {
        self.journal
            .events
            .lock()
            .iter()
            .filter(|event| event.phase == phase)
            .count()
    }

    /// Blocks until `phase` ran at least `count` times or `timeout` elapses.
    pub fn wait_for(&self, phase: Phase, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut events = self.journal.events.lock();
        loop {
            if events.iter().filter(|event| event.phase == phase).count() >= count {
                return true;
            }
            if self.journal.changed.wait_until(&mut events, deadline).timed_out() {
                return events.iter().filter(|event| event.phase == phase).count() >= count;
            }
        }
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.journal.events.lock().clear();
    }

    fn record(
        &self,
        phase: Phase,
        call: &Call,
        tags: &Tags<T1, T2>,
        result: Option<Result<String, String>>,
    ) {
        self.journal.events.lock().push(PhaseEvent {
            phase,
            method: call.method(),
            args: call.args().clone(),
            thread: thread::current().id(),
            extra: tags.extra().clone(),
            result,
        });
        self.journal.changed.notify_all();
    }
}

impl<T1, T2> Default for RecordingHandler<T1, T2> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T1, T2> Clone for RecordingHandler<T1, T2> {
    fn clone(&self) -> Self {
        Self {
            journal: self.journal.clone(),
            prepare: self.prepare.clone(),
            work: self.work.clone(),
            _tags: PhantomData,
        }
    }
}

impl<T1, T2> ActionHandler for RecordingHandler<T1, T2>
where
    T1: Send + Sync + 'static,
    T2: Send + Sync + 'static,
{
    type Tag1 = T1;
    type Tag2 = T2;
    type Output = String;

    fn prepare(&self, call: &Call, tags: &Tags<T1, T2>) -> Option<Reply> {
        self.record(Phase::Prepare, call, tags, None);
        self.prepare.as_ref().and_then(|prepare| prepare(call))
    }

    fn do_work(
        &self,
        call: &Call,
        tags: &Tags<T1, T2>,
        cancel: &CancelToken,
    ) -> Result<String, BoxError> {
        self.record(Phase::Work, call, tags, None);
        match &self.work {
            Some(work) => work(call, cancel),
            None => Ok(format!("{} done", call.method())),
        }
    }

    fn after_work(&self, call: &Call, result: WorkResult<String>, tags: &Tags<T1, T2>) {
        let result = result.map_err(|err| err.to_string());
        self.record(Phase::AfterWork, call, tags, Some(result));
    }
}

// ============================================================================
// Recording Target
// ============================================================================

/// An attachment received by a [`RecordingTarget`].
#[derive(Clone, Debug)]
pub struct Attachment {
    /// Attach method the action called.
    pub method: String,
    /// Interface the object was attached as.
    pub interface: InterfaceType,
    /// The attached interception object.
    pub object: InterceptionObject,
}

/// A target that records attachments and counts posted tasks.
///
/// Only the attach methods it was created with are accepted; anything else
/// fails with [`AttachError::MissingMethod`]. Targets compare equal by name.
/// Clones share their records.
#[derive(Clone)]
pub struct RecordingTarget {
    name: &'static str,
    accepts: Arc<BTreeSet<String>>,
    attachments: Arc<Mutex<Vec<Attachment>>>,
    posts: Arc<AtomicUsize>,
}

impl RecordingTarget {
    /// A target with the given name accepting the listed attach methods.
    pub fn accepting<S: Into<String>>(
        name: &'static str,
        methods: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            name,
            accepts: Arc::new(methods.into_iter().map(Into::into).collect()),
            attachments: Arc::default(),
            posts: Arc::default(),
        }
    }

    /// Name given at construction.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get a clone of the received attachments.
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.lock().clone()
    }

    /// Object attached through `method`, if any.
    pub fn attached(&self, method: &str) -> Option<InterceptionObject> {
        self.attachments
            .lock()
            .iter()
            .find(|attachment| attachment.method == method)
            .map(|attachment| attachment.object.clone())
    }

    /// Number of tasks posted through this target.
    pub fn posts(&self) -> usize {
        self.posts.load(Ordering::SeqCst)
    }
}

impl Target for RecordingTarget {
    fn attach(
        &self,
        method: &str,
        interface: InterfaceType,
        object: &InterceptionObject,
    ) -> Result<(), AttachError> {
        if !self.accepts.contains(method) {
            return Err(AttachError::MissingMethod {
                method: method.to_string(),
                interface: interface.name(),
            });
        }
        self.attachments.lock().push(Attachment {
            method: method.to_string(),
            interface,
            object: object.clone(),
        });
        Ok(())
    }

    fn post(&self, task: Task, fallback: &dyn Scheduler) {
        self.posts.fetch_add(1, Ordering::SeqCst);
        fallback.schedule(task);
    }
}

impl PartialEq for RecordingTarget {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for RecordingTarget {}

impl fmt::Debug for RecordingTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingTarget")
            .field("name", &self.name)
            .field("accepts", &self.accepts)
            .field("attachments", &self.attachments.lock().len())
            .finish()
    }
}
