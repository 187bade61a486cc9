//! Registrations and bindings: which interfaces a target exposes and which
//! of their methods are dispatched.

use crate::{
    error::ActionError,
    interface::{Interface, InterfaceType},
    object::InterceptionObject,
};
use std::collections::BTreeSet;

/// One declared interface of a binding.
///
/// Immutable once built; the builder methods consume `self`.
#[derive(Clone, Debug)]
pub struct Registration {
    interface: InterfaceType,
    attach_method: Option<String>,
    allowed_methods: Option<BTreeSet<String>>,
}

impl Registration {
    /// Registers `I` with no attach method and no method filter.
    pub fn new<I: ?Sized + Interface>() -> Self {
        Self::of(InterfaceType::of::<I>())
    }

    /// Registers a runtime interface descriptor.
    pub fn of(interface: InterfaceType) -> Self {
        Self {
            interface,
            attach_method: None,
            allowed_methods: None,
        }
    }

    /// Names the target method that receives the interception object.
    pub fn attach_with(mut self, method: impl Into<String>) -> Self {
        let method = method.into();
        self.attach_method = (!method.is_empty()).then_some(method);
        self
    }

    /// Restricts dispatch to the listed methods.
    ///
    /// An empty list leaves the registration unfiltered.
    pub fn allow<S: Into<String>>(mut self, methods: impl IntoIterator<Item = S>) -> Self {
        let methods: BTreeSet<String> = methods.into_iter().map(Into::into).collect();
        if !methods.is_empty() {
            self.allowed_methods
                .get_or_insert_with(BTreeSet::new)
                .extend(methods);
        }
        self
    }

    /// Replaces the allow-list with the listed methods.
    ///
    /// An empty list removes the filter.
    pub fn allow_only<S: Into<String>>(mut self, methods: impl IntoIterator<Item = S>) -> Self {
        self.allowed_methods = None;
        self.allow(methods)
    }

    /// Declared interface.
    pub fn interface(&self) -> InterfaceType {
        self.interface
    }

    /// Attach method name, if any.
    pub fn attach_method(&self) -> Option<&str> {
        self.attach_method.as_deref()
    }

    /// Allowed method names; `None` means all.
    pub fn allowed_methods(&self) -> Option<&BTreeSet<String>> {
        self.allowed_methods.as_ref()
    }

    /// Whether this registration carries a method filter.
    pub fn is_filtered(&self) -> bool {
        self.allowed_methods.is_some()
    }
}

/// A target (or none) with its registrations and, once registered, its
/// interception object.
#[derive(Clone, Debug)]
pub struct Binding<T> {
    target: Option<T>,
    registrations: Vec<Registration>,
    object: Option<InterceptionObject>,
    has_filter: bool,
}

impl<T> Default for Binding<T> {
    fn default() -> Self {
        Self::untargeted()
    }
}

impl<T> Binding<T> {
    /// A binding without a target.
    pub fn untargeted() -> Self {
        Self {
            target: None,
            registrations: Vec::new(),
            object: None,
            has_filter: false,
        }
    }

    /// A binding for `target`.
    pub fn targeted(target: T) -> Self {
        Self {
            target: Some(target),
            ..Self::untargeted()
        }
    }

    /// One binding per target, each with a copy of `registrations`.
    ///
    /// An empty target list yields a single untargeted binding.
    pub fn for_targets(
        targets: impl IntoIterator<Item = T>,
        registrations: &[Registration],
    ) -> Vec<Self> {
        let mut bindings: Vec<Self> = targets
            .into_iter()
            .map(|target| Self::targeted(target).register_all(registrations.iter().cloned()))
            .collect();
        if bindings.is_empty() {
            bindings.push(Self::untargeted().register_all(registrations.iter().cloned()));
        }
        bindings
    }

    /// Adds a registration.
    pub fn register(mut self, registration: Registration) -> Self {
        self.push_registration(registration);
        self
    }

    /// Adds several registrations.
    pub fn register_all(mut self, registrations: impl IntoIterator<Item = Registration>) -> Self {
        for registration in registrations {
            self.push_registration(registration);
        }
        self
    }

    /// Adds a registration in place.
    pub fn push_registration(&mut self, registration: Registration) {
        self.has_filter |= registration.is_filtered();
        self.registrations.push(registration);
    }

    /// Makes `methods` the allow-list of every registration, replacing any
    /// earlier one. An empty list changes nothing.
    pub fn restrict_to<S: Into<String> + Clone>(&mut self, methods: &[S]) {
        if methods.is_empty() {
            return;
        }
        let registrations = std::mem::take(&mut self.registrations);
        self.has_filter = false;
        for registration in registrations {
            self.push_registration(registration.allow_only(methods.iter().cloned()));
        }
    }

    /// The target, if any.
    pub fn target(&self) -> Option<&T> {
        self.target.as_ref()
    }

    /// Replaces the target, returning the previous one.
    pub fn set_target(&mut self, target: Option<T>) -> Option<T> {
        std::mem::replace(&mut self.target, target)
    }

    /// Registrations in declaration order.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    /// Declared interfaces in registration order.
    pub fn interfaces(&self) -> impl Iterator<Item = InterfaceType> + '_ {
        self.registrations.iter().map(Registration::interface)
    }

    /// The interception object, once registered.
    pub fn object(&self) -> Option<&InterceptionObject> {
        self.object.as_ref()
    }

    /// Installs the interception object built for this binding.
    pub fn install_object(&mut self, object: InterceptionObject) {
        self.object = Some(object);
    }

    /// Whether any registration carries a method filter.
    pub fn has_filter(&self) -> bool {
        self.has_filter
    }

    /// Whether a call to `method` passes the binding's filter.
    ///
    /// With a filter, the method must appear in at least one allow-list;
    /// unfiltered registrations do not admit anything on their own.
    pub fn allows(&self, method: &str) -> bool {
        !self.has_filter
            || self.registrations.iter().any(|registration| {
                registration
                    .allowed_methods()
                    .is_some_and(|allowed| allowed.contains(method))
            })
    }

    /// Checks every allowed method against the binding's interfaces.
    ///
    /// Allow-lists span the whole binding, so a name only needs to be
    /// declared by one of its interfaces.
    pub fn validate(&self) -> Result<(), ActionError> {
        for registration in &self.registrations {
            let Some(allowed) = registration.allowed_methods() else {
                continue;
            };
            let undeclared = allowed
                .iter()
                .find(|method| !self.interfaces().any(|interface| interface.declares(method)));
            if let Some(method) = undeclared {
                return Err(ActionError::UnknownMethod {
                    interface: registration.interface().name(),
                    method: method.clone(),
                });
            }
        }
        Ok(())
    }
}
