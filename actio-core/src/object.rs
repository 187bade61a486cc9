//! # Interception Layer
//!
//! An [`InterceptionObject`] is the single object a binding presents to its
//! host. It "is" every interface declared by the binding: a typed
//! [`Proxy`] can be taken for each of them, and whichever facade a call
//! arrives on, it lands in [`InterceptionObject::call`], which checks the
//! object's `(interface, method)` table and forwards a [`Call`] to the
//! owning [`Dispatch`] implementation.
//!
//! The object only holds a `Weak` reference to its dispatcher. Ownership runs
//! the other way: the dispatcher owns its bindings and their objects.

use crate::{
    error::ActionError,
    interface::{Interface, InterfaceType, Proxy},
    value::{MethodArgs, Reply},
};
use std::{
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an interception object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// One intercepted method call, as seen by every phase.
#[derive(Clone, Debug)]
pub struct Call {
    interface: InterfaceType,
    method: &'static str,
    args: MethodArgs,
}

impl Call {
    /// Creates a call record.
    pub fn new(interface: InterfaceType, method: &'static str, args: MethodArgs) -> Self {
        Self {
            interface,
            method,
            args,
        }
    }

    /// Interface that declared the method.
    pub fn interface(&self) -> InterfaceType {
        self.interface
    }

    /// Method name.
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Method arguments.
    pub fn args(&self) -> &MethodArgs {
        &self.args
    }
}

/// The dispatch entry point behind interception objects.
pub trait Dispatch: Send + Sync + 'static {
    /// Handles one call arriving on `object`.
    fn dispatch(self: Arc<Self>, object: ObjectId, call: Call) -> Result<Option<Reply>, ActionError>;
}

struct ObjectInner {
    id: ObjectId,
    interfaces: Vec<InterfaceType>,
    dispatcher: Weak<dyn Dispatch>,
}

/// The object a binding exposes to its host.
///
/// Clones share identity; equality is identity.
#[derive(Clone)]
pub struct InterceptionObject {
    inner: Arc<ObjectInner>,
}

impl InterceptionObject {
    /// Builds an object implementing every interface in `interfaces`.
    ///
    /// Fails with [`ActionError::NoInterfaces`] on an empty set and with
    /// [`ActionError::DuplicateInterface`] when an interface repeats.
    pub fn new(
        interfaces: impl IntoIterator<Item = InterfaceType>,
        dispatcher: Weak<dyn Dispatch>,
    ) -> Result<Self, ActionError> {
        let mut declared: Vec<InterfaceType> = Vec::new();
        for interface in interfaces {
            if declared.contains(&interface) {
                return Err(ActionError::DuplicateInterface(interface.name()));
            }
            declared.push(interface);
        }
        if declared.is_empty() {
            return Err(ActionError::NoInterfaces);
        }

        Ok(Self {
            inner: Arc::new(ObjectInner {
                id: ObjectId::next(),
                interfaces: declared,
                dispatcher,
            }),
        })
    }

    /// Identity of this object.
    pub fn id(&self) -> ObjectId {
        self.inner.id
    }

    /// Implemented interfaces, in registration order.
    pub fn interfaces(&self) -> &[InterfaceType] {
        &self.inner.interfaces
    }

    /// Whether the object implements `I`.
    pub fn implements<I: ?Sized + Interface>(&self) -> bool {
        self.implements_type(InterfaceType::of::<I>())
    }

    /// Whether the object implements `interface`.
    pub fn implements_type(&self, interface: InterfaceType) -> bool {
        self.inner.interfaces.contains(&interface)
    }

    /// Typed facade for `I`.
    pub fn facade<I: ?Sized + Interface>(&self) -> Result<Proxy<I>, ActionError> {
        if self.implements::<I>() {
            Ok(Proxy::new(self.clone()))
        } else {
            Err(ActionError::NotImplemented(I::NAME))
        }
    }

    /// Whether the owning dispatcher has been dropped.
    pub fn is_detached(&self) -> bool {
        self.inner.dispatcher.strong_count() == 0
    }

    /// Routes `interface::method(args)` to the owning dispatcher.
    pub fn call(
        &self,
        interface: InterfaceType,
        method: &str,
        args: MethodArgs,
    ) -> Result<Option<Reply>, ActionError> {
        let declared = self
            .inner
            .interfaces
            .iter()
            .find(|candidate| **candidate == interface)
            .ok_or(ActionError::NotImplemented(interface.name()))?;
        let method = declared
            .method(method)
            .ok_or_else(|| ActionError::UnknownMethod {
                interface: declared.name(),
                method: method.to_string(),
            })?;
        let dispatcher = self.inner.dispatcher.upgrade().ok_or(ActionError::Closed)?;

        dispatcher.dispatch(self.inner.id, Call::new(*declared, method, args))
    }
}

impl PartialEq for InterceptionObject {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for InterceptionObject {}

impl fmt::Debug for InterceptionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionObject")
            .field("id", &self.inner.id)
            .field("interfaces", &self.inner.interfaces)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::GenericInvoke;
    use std::sync::Mutex;

    trait Clickable: Send + Sync {}

    impl Interface for dyn Clickable {
        const NAME: &'static str = "Clickable";
        const METHODS: &'static [&'static str] = &["on_click"];
    }

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(ObjectId, &'static str, &'static str)>>,
    }

    impl Dispatch for Recorder {
        fn dispatch(
            self: Arc<Self>,
            object: ObjectId,
            call: Call,
        ) -> Result<Option<Reply>, ActionError> {
            self.calls
                .lock()
                .unwrap()
                .push((object, call.interface().name(), call.method()));
            Ok(Some(Reply::new(call.args().len())))
        }
    }

    fn object_for(recorder: &Arc<Recorder>) -> InterceptionObject {
        let weak: Weak<dyn Dispatch> = Arc::downgrade(recorder) as Weak<dyn Dispatch>;
        InterceptionObject::new(
            [
                InterfaceType::of::<dyn Clickable>(),
                InterfaceType::of::<dyn GenericInvoke>(),
            ],
            weak,
        )
        .unwrap()
    }

    #[test]
    fn routes_every_interface_to_one_entry() {
        let recorder = Arc::new(Recorder::default());
        let object = object_for(&recorder);

        let click = object
            .call(InterfaceType::of::<dyn Clickable>(), "on_click", crate::args![1, 2])
            .unwrap()
            .unwrap();
        assert_eq!(click.downcast::<usize>().unwrap(), 2);

        let generic = object.facade::<dyn GenericInvoke>().unwrap();
        assert!(generic.invoke(MethodArgs::new()).is_some());

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                (object.id(), "Clickable", "on_click"),
                (object.id(), "GenericInvoke", "invoke"),
            ]
        );
    }

    #[test]
    fn rejects_bad_declarations() {
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn Dispatch> = Arc::downgrade(&recorder) as Weak<dyn Dispatch>;

        let duplicate = InterceptionObject::new(
            [
                InterfaceType::of::<dyn Clickable>(),
                InterfaceType::of::<dyn Clickable>(),
            ],
            weak.clone(),
        );
        assert!(matches!(
            duplicate,
            Err(ActionError::DuplicateInterface("Clickable"))
        ));

        let empty = InterceptionObject::new([], weak);
        assert!(matches!(empty, Err(ActionError::NoInterfaces)));
    }

    #[test]
    fn unknown_method_and_interface() {
        let recorder = Arc::new(Recorder::default());
        let weak: Weak<dyn Dispatch> = Arc::downgrade(&recorder) as Weak<dyn Dispatch>;
        let object =
            InterceptionObject::new([InterfaceType::of::<dyn Clickable>()], weak).unwrap();

        assert!(matches!(
            object.call(InterfaceType::of::<dyn Clickable>(), "on_drag", MethodArgs::new()),
            Err(ActionError::UnknownMethod { interface: "Clickable", .. })
        ));
        assert!(matches!(
            object.facade::<dyn GenericInvoke>(),
            Err(ActionError::NotImplemented("GenericInvoke"))
        ));
        assert!(recorder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn dropped_dispatcher_reports_closed() {
        let recorder = Arc::new(Recorder::default());
        let object = object_for(&recorder);
        drop(recorder);

        assert!(object.is_detached());
        assert!(matches!(
            object.call(InterfaceType::of::<dyn Clickable>(), "on_click", MethodArgs::new()),
            Err(ActionError::Closed)
        ));
    }
}
