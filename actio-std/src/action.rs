//! The dispatcher.
//!
//! An [`Action`] owns its bindings, its tags and the records of in-flight work.
//! Each binding's interception object routes calls back here through a `Weak`
//! reference; [`Dispatch::dispatch`] then runs the prepare phase inline and
//! hands accepted calls to the work phase.

use crate::{
    config::ActionConfig,
    work::{self, WorkRecord, WorkSet},
};
use actio_core::{
    ActionError, ActionHandler, Binding, Call, Dispatch, GenericInvoke, InterceptionObject,
    Interface, InterfaceType, MethodArgs, NoTarget, ObjectId, Proxy, Reply, Scheduler, Tags,
    Target,
};
use parking_lot::RwLock;
use std::{
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

static NEXT_ACTION_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) type SharedTags<H> =
    Arc<Tags<<H as ActionHandler>::Tag1, <H as ActionHandler>::Tag2>>;

struct State<H: ActionHandler, T> {
    tags: Option<SharedTags<H>>,
    bindings: Vec<Binding<T>>,
    registered: bool,
}

pub(crate) struct Shared<H: ActionHandler, T: Target> {
    pub(crate) id: u64,
    pub(crate) handler: H,
    pub(crate) work: WorkSet,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) config: ActionConfig,
    state: RwLock<State<H, T>>,
    run_work: AtomicBool,
    skip_once: AtomicBool,
    closed: AtomicBool,
}

impl<H: ActionHandler, T: Target> Shared<H, T> {
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Intercepts calls on its bindings' interfaces and runs them through the
/// prepare / work / after-work pipeline.
///
/// `Action` is a cheap handle; clones refer to the same dispatcher. The
/// dispatcher lives until [`cancel`](Self::cancel) is called; dropping every
/// handle without cancelling detaches the interception objects but lets
/// in-flight work finish.
pub struct Action<H: ActionHandler, T: Target = NoTarget> {
    shared: Arc<Shared<H, T>>,
}

impl<H: ActionHandler, T: Target> Clone for Action<H, T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<H: ActionHandler, T: Target> Action<H, T> {
    /// Creates an unregistered action with default configuration.
    pub fn new(handler: H, tags: Tags<H::Tag1, H::Tag2>, scheduler: impl Scheduler) -> Self {
        Self::with_config(handler, tags, scheduler, ActionConfig::default())
    }

    /// Creates an unregistered action.
    pub fn with_config(
        handler: H,
        tags: Tags<H::Tag1, H::Tag2>,
        scheduler: impl Scheduler,
        config: ActionConfig,
    ) -> Self {
        let id = NEXT_ACTION_ID.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(action = id, run_work = config.run_work, "action created");
        Self {
            shared: Arc::new(Shared {
                id,
                handler,
                work: WorkSet::default(),
                scheduler: Arc::new(scheduler),
                run_work: AtomicBool::new(config.run_work),
                config,
                state: RwLock::new(State {
                    tags: Some(Arc::new(tags)),
                    bindings: Vec::new(),
                    registered: false,
                }),
                skip_once: AtomicBool::new(false),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Process-unique id of this action, used in log fields.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// The phase handler.
    pub fn handler(&self) -> &H {
        &self.shared.handler
    }

    /// Installs `bindings`, builds their interception objects and attaches
    /// them to their targets. Seals the action.
    ///
    /// Every attachment is attempted. Failed attachments are reported together
    /// as [`ActionError::Attach`]; the bindings stay registered either way.
    pub fn register(&self, mut bindings: Vec<Binding<T>>) -> Result<(), ActionError> {
        let mut state = self.shared.state.write();
        if self.shared.is_closed() {
            return Err(ActionError::Closed);
        }
        if state.registered {
            return Err(ActionError::AlreadyRegistered);
        }

        let dispatcher: Weak<dyn Dispatch> = Arc::downgrade(&self.shared) as Weak<dyn Dispatch>;
        for binding in &mut bindings {
            binding.validate()?;
            let object = InterceptionObject::new(binding.interfaces(), dispatcher.clone())?;
            binding.install_object(object);
        }

        let mut attachments: Vec<(T, String, InterfaceType, InterceptionObject)> = Vec::new();
        for binding in &bindings {
            let (Some(target), Some(object)) = (binding.target(), binding.object()) else {
                continue;
            };
            for registration in binding.registrations() {
                if let Some(method) = registration.attach_method() {
                    attachments.push((
                        target.clone(),
                        method.to_string(),
                        registration.interface(),
                        object.clone(),
                    ));
                }
            }
        }

        tracing::debug!(
            action = self.shared.id,
            bindings = bindings.len(),
            attachments = attachments.len(),
            "registering bindings"
        );
        state.bindings = bindings;
        state.registered = true;
        drop(state);

        let failures: Vec<_> = attachments
            .into_iter()
            .filter_map(|(target, method, interface, object)| {
                target.attach(&method, interface, &object).err().inspect(|err| {
                    tracing::warn!(
                        action = self.shared.id,
                        interface = interface.name(),
                        method = %method,
                        error = %err,
                        "attachment failed"
                    );
                })
            })
            .collect();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ActionError::Attach(failures))
        }
    }

    /// Facade for `I` from the first binding implementing it.
    pub fn handler_impl<I: ?Sized + Interface>(&self) -> Option<Proxy<I>> {
        let state = self.shared.state.read();
        state
            .bindings
            .iter()
            .filter_map(Binding::object)
            .find_map(|object| object.facade::<I>().ok())
    }

    /// Facade for `I` from the binding targeting `target`.
    pub fn handler_impl_for<I: ?Sized + Interface>(&self, target: &T) -> Option<Proxy<I>>
    where
        T: PartialEq,
    {
        let state = self.shared.state.read();
        state
            .bindings
            .iter()
            .filter(|binding| binding.target() == Some(target))
            .filter_map(Binding::object)
            .find_map(|object| object.facade::<I>().ok())
    }

    /// Targets of all bindings that have one, in binding order.
    pub fn targets(&self) -> Vec<T> {
        let state = self.shared.state.read();
        state
            .bindings
            .iter()
            .filter_map(|binding| binding.target().cloned())
            .collect()
    }

    /// Replaces the targets of the first `targets.len()` bindings in place.
    ///
    /// Objects are not re-attached; the new targets only affect where
    /// after-work tasks are posted and target lookups.
    pub fn replace_targets(&self, targets: impl IntoIterator<Item = T>) -> Result<(), ActionError> {
        let targets: Vec<T> = targets.into_iter().collect();
        let mut state = self.shared.state.write();
        if self.shared.is_closed() {
            return Err(ActionError::Closed);
        }
        if targets.len() > state.bindings.len() {
            return Err(ActionError::TargetCount {
                bindings: state.bindings.len(),
                targets: targets.len(),
            });
        }
        for (binding, target) in state.bindings.iter_mut().zip(targets) {
            binding.set_target(Some(target));
        }
        Ok(())
    }

    /// Enables or disables the work phase for subsequent calls.
    pub fn set_run_work(&self, run: bool) {
        self.shared.run_work.store(run, Ordering::Release);
    }

    /// Whether accepted calls currently start a work phase.
    pub fn runs_work(&self) -> bool {
        self.shared.run_work.load(Ordering::Acquire)
    }

    /// Skips the work phase of the next accepted call only.
    ///
    /// Calling this from `prepare` skips the work of the call being prepared.
    pub fn skip_work_once(&self) {
        self.shared.skip_once.store(true, Ordering::Release);
    }

    /// Pushes a call through the first binding implementing [`GenericInvoke`],
    /// on the calling thread.
    pub fn invoke_self(&self, args: MethodArgs) -> Result<Option<Reply>, ActionError> {
        let (proxy, _) = self.generic_binding()?;
        proxy.try_call("invoke", args)
    }

    /// Like [`invoke_self`](Self::invoke_self), but runs on the designated
    /// context (through the binding's target when it has one).
    pub fn invoke_self_on_main(&self, args: MethodArgs) -> Result<(), ActionError> {
        let (proxy, target) = self.generic_binding()?;
        let action = self.shared.id;
        let task = Box::new(move || {
            if let Err(err) = proxy.try_call("invoke", args) {
                tracing::warn!(action, error = %err, "scheduled self-invocation was not dispatched");
            }
        });
        match target {
            Some(target) => target.post(task, self.shared.scheduler.as_ref()),
            None => self.shared.scheduler.schedule(task),
        }
        Ok(())
    }

    fn generic_binding(&self) -> Result<(Proxy<dyn GenericInvoke>, Option<T>), ActionError> {
        let state = self.shared.state.read();
        if self.shared.is_closed() {
            return Err(ActionError::Closed);
        }
        state
            .bindings
            .iter()
            .find_map(|binding| {
                let proxy = binding.object()?.facade::<dyn GenericInvoke>().ok()?;
                Some((proxy, binding.target().cloned()))
            })
            .ok_or(ActionError::NotInvokable)
    }

    /// Number of work phases currently tracked.
    pub fn in_flight(&self) -> usize {
        self.shared.work.len()
    }

    /// Snapshot of the tracked work records.
    pub fn work_records(&self) -> Vec<WorkRecord> {
        self.shared.work.snapshot()
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.shared.is_closed()
    }

    /// Cancels in-flight work and tears the action down for good.
    ///
    /// Work phases that already passed their last checkpoint finish, but
    /// their after-work phase is suppressed. Bindings, targets, interception
    /// objects and tags are released; later dispatches fail with
    /// [`ActionError::Closed`].
    pub fn cancel(&self) {
        if self.shared.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let cancelled = self.shared.work.cancel_all();

        let released = {
            let mut state = self.shared.state.write();
            state.tags = None;
            std::mem::take(&mut state.bindings)
        };
        tracing::debug!(
            action = self.shared.id,
            cancelled,
            bindings = released.len(),
            "action cancelled"
        );
        drop(released);
    }
}

impl<H: ActionHandler, T: Target> Dispatch for Shared<H, T> {
    fn dispatch(self: Arc<Self>, object: ObjectId, call: Call) -> Result<Option<Reply>, ActionError> {
        let (tags, target) = {
            let state = self.state.read();
            if self.is_closed() {
                tracing::warn!(action = self.id, method = call.method(), "dispatch on cancelled action");
                return Err(ActionError::Closed);
            }
            let binding = state
                .bindings
                .iter()
                .find(|binding| binding.object().is_some_and(|candidate| candidate.id() == object))
                .ok_or(ActionError::UnknownObject)?;
            if !binding.allows(call.method()) {
                tracing::trace!(
                    action = self.id,
                    interface = call.interface().name(),
                    method = call.method(),
                    "call filtered out"
                );
                return Ok(None);
            }
            let tags = state.tags.clone().ok_or(ActionError::Closed)?;
            (tags, binding.target().cloned())
        };

        tracing::trace!(
            action = self.id,
            interface = call.interface().name(),
            method = call.method(),
            "prepare"
        );
        let reply = self.handler.prepare(&call, &tags);

        let skipped = self.skip_once.swap(false, Ordering::AcqRel);
        if skipped || !self.run_work.load(Ordering::Acquire) {
            tracing::debug!(
                action = self.id,
                method = call.method(),
                skipped,
                "work phase suppressed"
            );
            return Ok(reply);
        }

        // prepare already ran; a thread that cannot start costs only the work phase
        let (id, method) = (self.id, call.method());
        if let Err(err) = work::spawn(self, call, tags, target) {
            tracing::error!(action = id, method, error = %err, "could not spawn work thread");
        }
        Ok(reply)
    }
}

impl<H: ActionHandler, T: Target> fmt::Debug for Action<H, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("Action")
            .field("id", &self.shared.id)
            .field("bindings", &state.bindings.len())
            .field("in_flight", &self.shared.work.len())
            .field("cancelled", &self.shared.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::ActionBuilder,
        scheduler::QueueScheduler,
        testing::{Phase, RecordingHandler, RecordingTarget},
    };
    use actio_core::{AttachError, Registration};
    use std::{thread, time::Duration};

    const WAIT: Duration = Duration::from_secs(5);

    trait Clickable: Send + Sync {
        fn on_click(&self, x: u32) -> bool;
        fn on_hover(&self);
    }

    impl Interface for dyn Clickable {
        const NAME: &'static str = "Clickable";
        const METHODS: &'static [&'static str] = &["on_click", "on_hover"];
    }

    impl Clickable for Proxy<dyn Clickable> {
        fn on_click(&self, x: u32) -> bool {
            self.call_or_default("on_click", MethodArgs::new().with(x))
        }

        fn on_hover(&self) {
            self.call_or_default("on_hover", MethodArgs::new())
        }
    }

    fn untargeted(
        handler: RecordingHandler,
        registration: Registration,
    ) -> (Action<RecordingHandler>, QueueScheduler) {
        let scheduler = QueueScheduler::new();
        let action = Action::new(handler, Tags::empty(), scheduler.clone());
        action
            .register(vec![Binding::untargeted().register(registration)])
            .unwrap();
        (action, scheduler)
    }

    #[test]
    fn runs_three_phases_in_order() {
        let handler = RecordingHandler::new().with_prepare(|_| Some(Reply::new(true)));
        let (action, scheduler) = untargeted(handler.clone(), Registration::new::<dyn Clickable>());
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        assert!(facade.on_click(5));
        assert!(scheduler.run_until(WAIT, || {
            handler.count(Phase::AfterWork) == 1 && action.in_flight() == 0
        }));

        let events = handler.events();
        let phases: Vec<_> = events.iter().map(|event| event.phase).collect();
        assert_eq!(phases, vec![Phase::Prepare, Phase::Work, Phase::AfterWork]);
        assert_eq!(events[0].thread, thread::current().id());
        assert_ne!(events[1].thread, thread::current().id());
        assert_eq!(events[2].thread, thread::current().id());
        assert_eq!(events[1].args.get::<u32>(0), Some(&5));
        assert_eq!(events[2].result, Some(Ok("on_click done".to_string())));
    }

    #[test]
    fn filtered_calls_run_no_phase_and_keep_the_skip() {
        let handler = RecordingHandler::new().with_prepare(|_| Some(Reply::new(true)));
        let registration = Registration::new::<dyn Clickable>().allow(["on_click"]);
        let (action, scheduler) = untargeted(handler.clone(), registration);
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        action.skip_work_once();
        facade.on_hover();
        assert!(handler.events().is_empty());

        // the skip is consumed by the first accepted call
        assert!(facade.on_click(1));
        assert_eq!(handler.count(Phase::Prepare), 1);
        assert_eq!(action.in_flight(), 0);

        assert!(facade.on_click(2));
        assert!(scheduler.run_until(WAIT, || handler.count(Phase::AfterWork) == 1));
        assert_eq!(handler.count(Phase::Work), 1);
        assert_eq!(handler.events_of(Phase::Work)[0].args.get::<u32>(0), Some(&2));
    }

    #[test]
    fn disabled_work_only_prepares() {
        let handler: RecordingHandler = RecordingHandler::new();
        let scheduler = QueueScheduler::new();
        let action = Action::<_, NoTarget>::with_config(
            handler.clone(),
            Tags::empty(),
            scheduler.clone(),
            ActionConfig::default().run_work(false),
        );
        action
            .register(vec![Binding::untargeted().register(Registration::new::<dyn Clickable>())])
            .unwrap();
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        assert!(!action.runs_work());
        assert!(!facade.on_click(1));
        assert_eq!(handler.count(Phase::Prepare), 1);
        assert_eq!(action.in_flight(), 0);
        assert_eq!(scheduler.pending(), 0);

        action.set_run_work(true);
        facade.on_click(2);
        assert!(scheduler.run_until(WAIT, || handler.count(Phase::AfterWork) == 1));
    }

    #[cfg(all(target_os = "linux", target_pointer_width = "64"))]
    #[test]
    fn unstartable_work_thread_keeps_the_prepare_reply() {
        let handler = RecordingHandler::new().with_prepare(|_| Some(Reply::new(true)));
        let scheduler = QueueScheduler::new();
        // no address space can hold this stack
        let action = Action::<_, NoTarget>::with_config(
            handler.clone(),
            Tags::empty(),
            scheduler.clone(),
            ActionConfig::default().worker_stack_size(1 << 60),
        );
        action
            .register(vec![Binding::untargeted().register(Registration::new::<dyn Clickable>())])
            .unwrap();
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        assert!(facade.on_click(1));
        assert_eq!(handler.count(Phase::Prepare), 1);
        assert_eq!(action.in_flight(), 0);
        assert!(action.work_records().is_empty());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(handler.count(Phase::Work), 0);
    }

    #[test]
    fn cancel_suppresses_pending_after_work() {
        let (started_tx, started_rx) = crossbeam_channel::bounded(1);
        let handler = RecordingHandler::new().with_work(move |_, cancel| {
            let _ = started_tx.send(());
            while !cancel.is_cancelled() {
                thread::sleep(Duration::from_millis(2));
            }
            Ok("late".to_string())
        });
        let (action, scheduler) = untargeted(handler.clone(), Registration::new::<dyn Clickable>());
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        facade.on_click(1);
        started_rx.recv_timeout(WAIT).unwrap();
        assert_eq!(action.in_flight(), 1);
        assert!(action.work_records()[0].is_running());

        action.cancel();
        action.cancel();
        assert!(action.is_cancelled());
        assert!(scheduler.run_until(WAIT, || action.in_flight() == 0));
        assert_eq!(scheduler.run_pending(), 0);
        assert_eq!(handler.count(Phase::AfterWork), 0);

        assert!(matches!(
            facade.try_call("on_click", MethodArgs::new().with(2_u32)),
            Err(ActionError::Closed)
        ));
        assert!(!facade.on_click(2));
        assert_eq!(handler.count(Phase::Prepare), 1);
        assert!(action.handler_impl::<dyn Clickable>().is_none());
        assert!(matches!(action.register(Vec::new()), Err(ActionError::Closed)));
    }

    #[test]
    fn concurrent_calls_complete_independently() {
        let (release_tx, release_rx) = crossbeam_channel::bounded::<()>(1);
        let handler = RecordingHandler::new().with_work(move |call, _| {
            if call.args().get::<u32>(0) == Some(&1) {
                release_rx.recv_timeout(WAIT)?;
            }
            Ok(format!("call {}", call.args().get::<u32>(0).copied().unwrap_or_default()))
        });
        let (action, scheduler) = untargeted(handler.clone(), Registration::new::<dyn Clickable>());
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        facade.on_click(1);
        facade.on_click(2);
        assert!(scheduler.run_until(WAIT, || {
            handler.count(Phase::AfterWork) == 1 && action.in_flight() == 1
        }));

        release_tx.send(()).unwrap();
        assert!(scheduler.run_until(WAIT, || handler.count(Phase::AfterWork) == 2));

        let results: Vec<_> = handler
            .events_of(Phase::AfterWork)
            .into_iter()
            .filter_map(|event| event.result)
            .collect();
        assert_eq!(results, vec![Ok("call 2".to_string()), Ok("call 1".to_string())]);
    }

    #[test]
    fn work_failures_reach_after_work() {
        let handler = RecordingHandler::new().with_work(|call, _| match call.args().get::<u32>(0) {
            Some(0) => Err("boom".into()),
            _ => panic!("worker exploded"),
        });
        let (action, scheduler) = untargeted(handler.clone(), Registration::new::<dyn Clickable>());
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        facade.on_click(0);
        assert!(scheduler.run_until(WAIT, || handler.count(Phase::AfterWork) == 1));
        facade.on_click(1);
        assert!(scheduler.run_until(WAIT, || handler.count(Phase::AfterWork) == 2));

        let results: Vec<_> = handler
            .events_of(Phase::AfterWork)
            .into_iter()
            .filter_map(|event| event.result)
            .collect();
        assert_eq!(
            results,
            vec![
                Err("work failed: boom".to_string()),
                Err("work panicked: worker exploded".to_string()),
            ]
        );
    }

    #[test]
    fn attach_failures_are_reported_but_bindings_stay() {
        let target = RecordingTarget::accepting("button", ["set_on_click"]);
        let scheduler = QueueScheduler::new();
        let handler: RecordingHandler = RecordingHandler::new();
        let action = Action::new(handler.clone(), Tags::empty(), scheduler.clone());

        let err = ActionBuilder::new()
            .with([target.clone()])
            .reg::<dyn Clickable>("set_on_click")
            .reg::<dyn GenericInvoke>("set_generic")
            .pack(&action)
            .unwrap_err();
        match err {
            ActionError::Attach(failures) => {
                assert_eq!(failures.len(), 1);
                assert!(matches!(
                    &failures[0],
                    AttachError::MissingMethod { method, interface: "GenericInvoke" }
                        if method == "set_generic"
                ));
            }
            other => panic!("unexpected error: {other}"),
        }

        let object = target.attached("set_on_click").unwrap();
        assert!(object.implements::<dyn Clickable>());
        assert!(object.implements::<dyn GenericInvoke>());

        object.facade::<dyn Clickable>().unwrap().on_click(3);
        assert!(scheduler.run_until(WAIT, || handler.count(Phase::AfterWork) == 1));
        assert_eq!(target.posts(), 1);

        assert!(matches!(action.register(Vec::new()), Err(ActionError::AlreadyRegistered)));
    }

    #[test]
    fn targets_can_be_listed_and_replaced() {
        let first = RecordingTarget::accepting("first", ["set_on_click"]);
        let second = RecordingTarget::accepting("second", ["set_on_click"]);
        let handler: RecordingHandler = RecordingHandler::new();
        let action = Action::new(handler, Tags::empty(), QueueScheduler::new());
        ActionBuilder::new()
            .with([first.clone(), second.clone()])
            .reg::<dyn Clickable>("set_on_click")
            .pack(&action)
            .unwrap();

        assert_eq!(action.targets(), vec![first.clone(), second.clone()]);
        let for_second = action.handler_impl_for::<dyn Clickable>(&second).unwrap();
        assert_eq!(Some(for_second.object().clone()), second.attached("set_on_click"));
        assert!(action.handler_impl_for::<dyn GenericInvoke>(&second).is_none());

        let third = RecordingTarget::accepting("third", Vec::<String>::new());
        assert!(matches!(
            action.replace_targets([third.clone(), first.clone(), second.clone()]),
            Err(ActionError::TargetCount { bindings: 2, targets: 3 })
        ));
        action.replace_targets([third.clone()]).unwrap();
        assert_eq!(action.targets(), vec![third.clone(), second]);
        assert!(third.attachments().is_empty());
        assert!(action.handler_impl_for::<dyn Clickable>(&first).is_none());
    }

    #[test]
    fn invokes_itself_through_generic_invoke() {
        let handler = RecordingHandler::new().with_prepare(|call| {
            call.args().get::<&str>(0).map(|s| Reply::new(s.len()))
        });
        let (action, scheduler) = untargeted(handler.clone(), Registration::new::<dyn GenericInvoke>());

        let reply = action.invoke_self(MethodArgs::new().with("four")).unwrap();
        assert_eq!(reply.and_then(|r| r.downcast::<usize>().ok()), Some(4));
        assert_eq!(handler.events_of(Phase::Prepare)[0].method, "invoke");

        action.invoke_self_on_main(MethodArgs::new().with("scheduled")).unwrap();
        assert_eq!(handler.count(Phase::Prepare), 1);
        assert!(scheduler.run_until(WAIT, || handler.count(Phase::AfterWork) == 2));
        assert_eq!(handler.count(Phase::Prepare), 2);

        let (plain, _) = untargeted(RecordingHandler::new(), Registration::new::<dyn Clickable>());
        assert!(matches!(plain.invoke_self(MethodArgs::new()), Err(ActionError::NotInvokable)));
    }

    #[test]
    fn dropped_action_detaches_objects() {
        let (action, _scheduler) =
            untargeted(RecordingHandler::new(), Registration::new::<dyn Clickable>());
        let facade = action.handler_impl::<dyn Clickable>().unwrap();

        drop(action);
        assert!(facade.object().is_detached());
        assert!(matches!(
            facade.try_call("on_hover", MethodArgs::new()),
            Err(ActionError::Closed)
        ));
    }
}
