//! Fluent construction of bindings.

use crate::action::Action;
use actio_core::{ActionError, ActionHandler, Binding, Interface, Registration, Target};

/// Builds bindings in target groups.
///
/// [`with`](Self::with) and [`and`](Self::and) open a group with one binding
/// per target (or a single untargeted binding for an empty list). `reg`
/// calls add a registration to every binding of the open group, and
/// [`invoke_only`](Self::invoke_only) narrows what that group dispatches.
///
/// ```rust,ignore
/// ActionBuilder::new()
///     .with([ok_button, cancel_button])
///     .reg::<dyn Clickable>("set_on_click")
///     .invoke_only(&["on_click"])
///     .and([list])
///     .reg::<dyn Selectable>("set_on_select")
///     .pack(&action)?;
/// ```
#[must_use = "bindings are only installed by `pack` or `build`"]
pub struct ActionBuilder<T> {
    bindings: Vec<Binding<T>>,
    group: Vec<Binding<T>>,
}

impl<T: Target> Default for ActionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Target> ActionBuilder<T> {
    /// Create a builder with no groups.
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            group: Vec::new(),
        }
    }

    /// Opens a group for `targets`, closing the previous one.
    pub fn with(mut self, targets: impl IntoIterator<Item = T>) -> Self {
        self.flush();
        self.group = Binding::for_targets(targets, &[]);
        self
    }

    /// Same as [`with`](Self::with); reads better after the first group.
    pub fn and(self, targets: impl IntoIterator<Item = T>) -> Self {
        self.with(targets)
    }

    /// Opens a group with a single untargeted binding.
    pub fn untargeted(self) -> Self {
        self.with(std::iter::empty())
    }

    /// Registers interface `I`, attached through the target method
    /// `attach_method`.
    pub fn reg<I: ?Sized + Interface>(self, attach_method: impl Into<String>) -> Self {
        self.registration(Registration::new::<I>().attach_with(attach_method))
    }

    /// Registers interface `I` without attaching it anywhere.
    pub fn reg_only<I: ?Sized + Interface>(self) -> Self {
        self.registration(Registration::new::<I>())
    }

    /// Adds `registration` to every binding of the open group.
    ///
    /// Without an open group, an untargeted one is opened first.
    pub fn registration(mut self, registration: Registration) -> Self {
        if self.group.is_empty() {
            self.group.push(Binding::untargeted());
        }
        for binding in &mut self.group {
            binding.push_registration(registration.clone());
        }
        self
    }

    /// Restricts the open group to the listed method names, replacing any
    /// list given before.
    ///
    /// An empty list leaves the group as it is.
    pub fn invoke_only<S: Into<String> + Clone>(mut self, methods: &[S]) -> Self {
        for binding in &mut self.group {
            binding.restrict_to(methods);
        }
        self
    }

    /// Returns every binding built so far, in order.
    pub fn build(mut self) -> Vec<Binding<T>> {
        self.flush();
        self.bindings
    }

    /// Registers the built bindings with `action`.
    pub fn pack<H: ActionHandler>(self, action: &Action<H, T>) -> Result<(), ActionError> {
        action.register(self.build())
    }

    fn flush(&mut self) {
        self.bindings.append(&mut self.group);
    }
}
