//! Error types for actio.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ActionError`] - Errors raised by registration, dispatch and lifecycle calls
//! - [`AttachError`] - A target refused or could not accept an interception object
//! - [`WorkError`] - A work phase failed; delivered to the after-work phase

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by an action's registration, dispatch and lifecycle operations.
#[derive(Error, Debug)]
pub enum ActionError {
    /// The action was cancelled; no further dispatch is possible.
    #[error("action has been cancelled")]
    Closed,

    /// The interception object does not belong to any binding of this action.
    #[error("interception object is not bound to this action")]
    UnknownObject,

    /// Bindings were already registered; an action is sealed after registration.
    #[error("action bindings are already registered")]
    AlreadyRegistered,

    /// A binding declared no interface.
    #[error("binding declares no interface")]
    NoInterfaces,

    /// The same interface was declared twice for one binding.
    #[error("interface `{0}` is declared more than once for one binding")]
    DuplicateInterface(&'static str),

    /// The interception object does not implement the requested interface.
    #[error("interception object does not implement `{0}`")]
    NotImplemented(&'static str),

    /// A method name is not declared by the interface it was used with.
    #[error("interface `{interface}` declares no method `{method}`")]
    UnknownMethod {
        /// Interface name.
        interface: &'static str,
        /// Offending method name.
        method: String,
    },

    /// More replacement targets than bindings.
    #[error("{targets} targets supplied for {bindings} bindings")]
    TargetCount {
        /// Number of registered bindings.
        bindings: usize,
        /// Number of targets supplied.
        targets: usize,
    },

    /// No binding exposes the generic invoke interface.
    #[error("no binding implements `GenericInvoke`")]
    NotInvokable,

    /// One or more targets failed to attach their interception object.
    #[error("{} attachment(s) failed", .0.len())]
    Attach(Vec<AttachError>),
}

/// Errors reported by [`Target::attach`](crate::Target::attach).
#[derive(Error, Debug)]
pub enum AttachError {
    /// The target has no attach method with that name for the interface.
    #[error("target has no method `{method}` accepting `{interface}`")]
    MissingMethod {
        /// Attach method name.
        method: String,
        /// Interface the method was expected to accept.
        interface: &'static str,
    },

    /// The attach method exists but rejected the interception object.
    #[error("attach method `{method}` rejected the interception object")]
    Rejected {
        /// Attach method name.
        method: String,
        /// Underlying failure.
        #[source]
        source: BoxError,
    },
}

/// Failure of a work phase, handed to the after-work phase in place of a result.
#[derive(Error, Debug)]
pub enum WorkError {
    /// The work function returned an error.
    #[error("work failed: {0}")]
    Failed(#[source] BoxError),

    /// The work function panicked.
    #[error("work panicked: {0}")]
    Panicked(String),
}

impl From<BoxError> for WorkError {
    fn from(err: BoxError) -> Self {
        WorkError::Failed(err)
    }
}

impl WorkError {
    /// Builds a [`WorkError::Panicked`] from a caught panic payload.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        WorkError::Panicked(panic_message(payload.as_ref()))
    }
}

/// Extracts a readable message from a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payloads_render() {
        let err = WorkError::from_panic(Box::new("boom"));
        assert_eq!(err.to_string(), "work panicked: boom");

        let err = WorkError::from_panic(Box::new(String::from("owned")));
        assert!(matches!(err, WorkError::Panicked(ref m) if m == "owned"));

        let err = WorkError::from_panic(Box::new(42_u8));
        assert!(matches!(err, WorkError::Panicked(ref m) if m == "non-string panic payload"));
    }

    #[test]
    fn attach_failures_count_in_message() {
        let err = ActionError::Attach(vec![
            AttachError::MissingMethod {
                method: "set_listener".into(),
                interface: "Clickable",
            },
            AttachError::Rejected {
                method: "set_listener".into(),
                source: "busy".into(),
            },
        ]);
        assert_eq!(err.to_string(), "2 attachment(s) failed");
    }
}
