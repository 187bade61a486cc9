//! # Phase Layer
//!
//! [`ActionHandler`] is where user behavior lives. Every intercepted call that
//! survives filtering goes through up to three phases:
//!
//! 1. [`prepare`](ActionHandler::prepare) on the calling thread. Its reply is
//!    the only value the caller ever sees.
//! 2. [`do_work`](ActionHandler::do_work) on a freshly spawned thread. May block.
//! 3. [`after_work`](ActionHandler::after_work) on the designated context with
//!    the work result.
//!
//! All three receive the same [`Call`] and the same [`Tags`].

use crate::{
    error::{BoxError, WorkError},
    object::Call,
    value::{Reply, Value},
};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::{
    any::Any,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// Outcome of a work phase as delivered to the after-work phase.
pub type WorkResult<T> = Result<T, WorkError>;

/// Cooperative cancellation flag shared by a work record and its work thread.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// A live token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Irreversible.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelToken")
            .field(&self.is_cancelled())
            .finish()
    }
}

/// Shared, mutable list of additional tags.
///
/// Every phase of every call sees the same list; a phase may mutate it and
/// later phases observe the change.
#[derive(Clone, Default)]
pub struct ExtraTags {
    values: Arc<RwLock<Vec<Value>>>,
}

impl ExtraTags {
    /// Wraps existing values.
    pub fn new(values: Vec<Value>) -> Self {
        Self {
            values: Arc::new(RwLock::new(values)),
        }
    }

    /// Appends a tag.
    pub fn push<T: Any + Send + Sync>(&self, value: T) {
        self.values.write().push(Arc::new(value));
    }

    /// The tag at `index` if it has type `T`.
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Option<Arc<T>> {
        let value = self.values.read().get(index).cloned()?;
        value.downcast::<T>().ok()
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Whether there are no tags.
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Read access to the whole list.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Value>> {
        self.values.read()
    }

    /// Write access to the whole list.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<Value>> {
        self.values.write()
    }

    /// Whether both handles refer to the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.values, &other.values)
    }
}

impl fmt::Debug for ExtraTags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtraTags").field("len", &self.len()).finish()
    }
}

/// Tags fixed at action construction and passed to every phase.
pub struct Tags<T1, T2> {
    tag1: T1,
    tag2: T2,
    extra: ExtraTags,
}

impl<T1, T2> Tags<T1, T2> {
    /// Two primary tags and no extra tags.
    pub fn new(tag1: T1, tag2: T2) -> Self {
        Self {
            tag1,
            tag2,
            extra: ExtraTags::default(),
        }
    }

    /// Replaces the extra tags.
    pub fn with_extra(mut self, extra: ExtraTags) -> Self {
        self.extra = extra;
        self
    }

    /// First tag.
    pub fn tag1(&self) -> &T1 {
        &self.tag1
    }

    /// Second tag.
    pub fn tag2(&self) -> &T2 {
        &self.tag2
    }

    /// Extra tags.
    pub fn extra(&self) -> &ExtraTags {
        &self.extra
    }
}

impl Tags<(), ()> {
    /// No tags at all.
    pub fn empty() -> Self {
        Self::new((), ())
    }
}

impl<T1: fmt::Debug, T2: fmt::Debug> fmt::Debug for Tags<T1, T2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tags")
            .field("tag1", &self.tag1)
            .field("tag2", &self.tag2)
            .field("extra", &self.extra)
            .finish()
    }
}

/// The three phases of an action.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `ActionHandler`",
    label = "missing `ActionHandler` implementation",
    note = "Implement at least `do_work`; `prepare` and `after_work` default to no-ops."
)]
pub trait ActionHandler: Send + Sync + 'static {
    /// Type of the first tag.
    type Tag1: Send + Sync + 'static;
    /// Type of the second tag.
    type Tag2: Send + Sync + 'static;
    /// Result of the work phase.
    type Output: Send + 'static;

    /// Phase 1, on the calling thread. Must not block.
    fn prepare(&self, call: &Call, tags: &Tags<Self::Tag1, Self::Tag2>) -> Option<Reply> {
        let _ = (call, tags);
        None
    }

    /// Phase 2, on a dedicated thread. `cancel` flips when the action is cancelled.
    fn do_work(
        &self,
        call: &Call,
        tags: &Tags<Self::Tag1, Self::Tag2>,
        cancel: &CancelToken,
    ) -> Result<Self::Output, BoxError>;

    /// Phase 3, on the designated context.
    fn after_work(
        &self,
        call: &Call,
        result: WorkResult<Self::Output>,
        tags: &Tags<Self::Tag1, Self::Tag2>,
    ) {
        let _ = (call, result, tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_tags_share_identity() {
        let extra = ExtraTags::new(vec![Arc::new(1_u32) as Value]);
        let tags = Tags::new("a", 2).with_extra(extra.clone());

        assert!(tags.extra().ptr_eq(&extra));
        tags.extra().push("added".to_string());
        assert_eq!(extra.len(), 2);
        assert_eq!(*extra.get::<u32>(0).unwrap(), 1);
        assert_eq!(extra.get::<String>(1).unwrap().as_str(), "added");
        assert!(extra.get::<u32>(1).is_none());
        assert!(!extra.ptr_eq(&ExtraTags::default()));
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let worker = token.clone();
        assert!(!worker.is_cancelled());
        token.cancel();
        assert!(worker.is_cancelled());
    }
}
