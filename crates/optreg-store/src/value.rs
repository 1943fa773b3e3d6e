use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Bound for every value a key can hold.
///
/// Values must be cloneable (the store hands out owned copies), debuggable
/// (for rendering defaults and stores) and shareable across threads.
pub trait KeyValue: Any + Clone + fmt::Debug + Send + Sync {}

impl<T: Any + Clone + fmt::Debug + Send + Sync> KeyValue for T {}

/// A boxed, untyped value as held by a [`Store`](crate::Store).
///
/// Values are immutable once stored; replacing a value swaps the `Arc`.
pub type RawValue = Arc<dyn Any + Send + Sync>;

/// Box a typed value into a [`RawValue`].
pub fn raw<T: KeyValue>(value: T) -> RawValue {
    Arc::new(value)
}
