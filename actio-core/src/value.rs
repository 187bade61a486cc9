//! Type-erased values crossing the interception boundary.
//!
//! Intercepted methods come from arbitrary interfaces, so their arguments are
//! carried as an ordered list of shared [`Value`]s and the prepare phase answers
//! with an optional [`Reply`] that the typed facade downcasts back to the
//! method's return type.

use std::{any::Any, fmt, sync::Arc};

/// A shared, type-erased value.
pub type Value = Arc<dyn Any + Send + Sync>;

/// Ordered, type-erased arguments of one intercepted call.
///
/// Cloning is cheap: values are reference counted, so all three phases of a
/// call observe the very same argument objects.
#[derive(Clone, Default)]
pub struct MethodArgs {
    values: Vec<Value>,
}

impl MethodArgs {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Creates an empty argument list with room for `capacity` values.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends an owned value.
    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    /// Appends an already shared value.
    pub fn push_value(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Builder-style [`push`](Self::push).
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Returns the argument at `index` if it has type `T`.
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        let value: &(dyn Any + Send + Sync) = self.values.get(index)?.as_ref();
        value.downcast_ref::<T>()
    }

    /// Returns the shared value at `index`.
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the call carried no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the shared values.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}

impl fmt::Debug for MethodArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodArgs")
            .field("len", &self.values.len())
            .finish()
    }
}

impl FromIterator<Value> for MethodArgs {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MethodArgs {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Builds a [`MethodArgs`] from a list of expressions.
///
/// ```rust,ignore
/// let args = actio::args![42_i32, String::from("label")];
/// assert_eq!(args.get::<i32>(0), Some(&42));
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::MethodArgs::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut args = $crate::MethodArgs::new();
        $(args.push($value);)+
        args
    }};
}

/// The value a prepare phase hands back to the caller.
pub struct Reply(Box<dyn Any + Send>);

impl Reply {
    /// Wraps a value.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Whether the reply holds a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.0.is::<T>()
    }

    /// Borrows the reply as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Takes the reply as a `T`, giving it back unchanged on a type mismatch.
    pub fn downcast<T: Any>(self) -> Result<T, Reply> {
        self.0.downcast::<T>().map(|boxed| *boxed).map_err(Reply)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Reply(..)")
    }
}
