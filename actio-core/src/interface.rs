//! # Interface Layer
//!
//! A callback interface is an object-safe trait whose methods a host invokes
//! when something happens (a click, a selection, a state change). actio never
//! implements those traits by hand: every interface gets a descriptor
//! ([`Interface`]) and a forwarding facade ([`Proxy`]) whose methods pack their
//! arguments and route them to the shared interception entry point.
//!
//! Both pieces are normally generated by `#[actio::interface]`; writing them
//! by hand is equally supported and is what [`GenericInvoke`] does below.

use crate::{
    error::ActionError,
    object::InterceptionObject,
    value::{MethodArgs, Reply},
};
use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

/// Static description of a callback interface.
///
/// Implemented for the trait object type (`dyn Clickable`), so the trait
/// itself is the identity of the interface.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an actio interface",
    label = "missing `Interface` descriptor",
    note = "Annotate the trait with `#[actio::interface]` or implement `Interface` for `dyn Trait`."
)]
pub trait Interface: 'static {
    /// Human-readable interface name.
    const NAME: &'static str;
    /// Every method the interface declares, in declaration order.
    const METHODS: &'static [&'static str];
}

/// Runtime handle of an [`Interface`].
#[derive(Clone, Copy)]
pub struct InterfaceType {
    id: TypeId,
    name: &'static str,
    methods: &'static [&'static str],
}

impl InterfaceType {
    /// Descriptor of `I`.
    pub fn of<I: ?Sized + Interface>() -> Self {
        Self {
            id: TypeId::of::<I>(),
            name: I::NAME,
            methods: I::METHODS,
        }
    }

    /// Interface name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared method names.
    pub fn methods(&self) -> &'static [&'static str] {
        self.methods
    }

    /// Resolves `name` to the declared method name.
    pub fn method(&self, name: &str) -> Option<&'static str> {
        self.methods.iter().copied().find(|m| *m == name)
    }

    /// Whether the interface declares `name`.
    pub fn declares(&self, name: &str) -> bool {
        self.method(name).is_some()
    }
}

impl PartialEq for InterfaceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InterfaceType {}

impl Hash for InterfaceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InterfaceType").field(&self.name).finish()
    }
}

/// Typed facade of an [`InterceptionObject`] for the interface `I`.
///
/// `Proxy<dyn I>` implements `I` (via `#[actio::interface]`), so it can be
/// handed to a host wherever a `Box<dyn I>` or `Arc<dyn I>` listener is
/// expected. Every method forwards to the object's dispatch entry point.
pub struct Proxy<I: ?Sized> {
    object: InterceptionObject,
    _interface: PhantomData<fn() -> Box<I>>,
}

impl<I: ?Sized + Interface> Proxy<I> {
    pub(crate) fn new(object: InterceptionObject) -> Self {
        Self {
            object,
            _interface: PhantomData,
        }
    }

    /// The interception object behind this facade.
    pub fn object(&self) -> &InterceptionObject {
        &self.object
    }

    /// Routes `method` through the interception object, surfacing dispatch errors.
    pub fn try_call(&self, method: &str, args: MethodArgs) -> Result<Option<Reply>, ActionError> {
        self.object.call(InterfaceType::of::<I>(), method, args)
    }

    /// Routes `method` and converts the prepare reply into the method's return type.
    ///
    /// Trait methods cannot report dispatch failures, so a missing reply, a
    /// reply of another type, or a dispatch error all yield `R::default()`.
    pub fn call_or_default<R: Any + Default>(&self, method: &'static str, args: MethodArgs) -> R {
        match self.try_call(method, args) {
            Ok(Some(reply)) => match reply.downcast::<R>() {
                Ok(value) => value,
                Err(_) => {
                    if TypeId::of::<R>() != TypeId::of::<()>() {
                        tracing::warn!(
                            interface = I::NAME,
                            method,
                            "prepare reply does not match the return type; returning default"
                        );
                    }
                    R::default()
                }
            },
            Ok(None) => R::default(),
            Err(err) => {
                tracing::warn!(
                    interface = I::NAME,
                    method,
                    error = %err,
                    "intercepted call was not dispatched; returning default"
                );
                R::default()
            }
        }
    }
}

impl<I: ?Sized> Clone for Proxy<I> {
    fn clone(&self) -> Self {
        Self {
            object: self.object.clone(),
            _interface: PhantomData,
        }
    }
}

impl<I: ?Sized + Interface> fmt::Debug for Proxy<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("interface", &I::NAME)
            .field("object", &self.object.id())
            .finish()
    }
}

/// Single-method interface an action can drive by itself.
///
/// Registering it next to host interfaces lets an action's `invoke_self`
/// push a call through the pipeline without waiting for the host.
pub trait GenericInvoke: Send + Sync {
    /// Invokes the action with arbitrary arguments.
    fn invoke(&self, args: MethodArgs) -> Option<Reply>;
}

impl Interface for dyn GenericInvoke {
    const NAME: &'static str = "GenericInvoke";
    const METHODS: &'static [&'static str] = &["invoke"];
}

impl GenericInvoke for Proxy<dyn GenericInvoke> {
    fn invoke(&self, args: MethodArgs) -> Option<Reply> {
        match self.try_call("invoke", args) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "generic invoke was not dispatched");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Clickable: Send + Sync {
        fn on_click(&self, x: i32) -> bool;
    }

    impl Interface for dyn Clickable {
        const NAME: &'static str = "Clickable";
        const METHODS: &'static [&'static str] = &["on_click", "on_hover"];
    }

    #[test]
    fn descriptor_identity() {
        let a = InterfaceType::of::<dyn Clickable>();
        let b = InterfaceType::of::<dyn GenericInvoke>();
        assert_eq!(a, InterfaceType::of::<dyn Clickable>());
        assert_ne!(a, b);
        assert_eq!(a.name(), "Clickable");
        assert_eq!(a.method("on_hover"), Some("on_hover"));
        assert!(!a.declares("invoke"));
        assert!(b.declares("invoke"));
    }
}
