use std::any::Any;
use std::fmt;
use std::sync::Arc;

use optreg_types::ValueType;

use crate::definition::StoreDefinition;
use crate::error::{KeyError, KeyResult};
use crate::key::Key;
use crate::render;
use crate::store::Store;
use crate::value::{raw, KeyValue, RawValue};

/// Object-safe view of a [`Key`] with its value type erased.
///
/// Definitions and stores keep keys of different value types side by side as
/// `Arc<dyn AnyKey>`. Every `Key<T>` implements this trait; values cross it
/// as [`RawValue`] and are downcast to `T` inside.
pub trait AnyKey: Send + Sync + 'static {
    fn name(&self) -> &str;

    fn label(&self) -> &str;

    fn value_type(&self) -> ValueType;

    /// Simple name of the declared value type.
    fn type_name(&self) -> String {
        self.value_type().simple_name()
    }

    fn has_default(&self) -> bool;

    /// A fresh default value, boxed.
    fn default_raw(&self) -> Option<RawValue>;

    fn has_codec(&self) -> bool;

    /// Whether `value` is of this key's static value type.
    fn accepts_raw(&self, value: &(dyn Any + Send + Sync)) -> bool;

    fn encode_raw(&self, value: &(dyn Any + Send + Sync)) -> KeyResult<String>;

    fn decode_raw(&self, encoded: &str) -> KeyResult<RawValue>;

    /// Copy a stored value with the key's copy function. Without one the same
    /// allocation is shared.
    fn copy_raw(&self, value: &RawValue) -> KeyResult<RawValue>;

    /// Run the key's get-interceptor over a boxed value.
    fn apply_getter_raw(&self, value: RawValue, store: &Store) -> KeyResult<RawValue>;

    /// Run the key's set-interceptor over a boxed value.
    fn apply_setter_raw(&self, value: RawValue, store: &Store) -> KeyResult<RawValue>;

    /// `Debug` rendering of a value of this key's type.
    fn debug_raw(&self, value: &(dyn Any + Send + Sync)) -> Option<String>;

    fn definition(&self) -> Option<&Arc<StoreDefinition>>;

    fn as_any(&self) -> &dyn Any;

    fn clone_arc(&self) -> Arc<dyn AnyKey>;
}

impl<T: KeyValue> Key<T> {
    fn mismatch(&self) -> KeyError {
        KeyError::TypeMismatch {
            key: Key::name(self).to_string(),
            expected: ValueType::of::<T>().simple_name(),
        }
    }

    fn downcast_value<'a>(&self, value: &'a (dyn Any + Send + Sync)) -> KeyResult<&'a T> {
        value.downcast_ref::<T>().ok_or_else(|| self.mismatch())
    }
}

impl<T: KeyValue> AnyKey for Key<T> {
    fn name(&self) -> &str {
        Key::name(self)
    }

    fn label(&self) -> &str {
        Key::label(self)
    }

    fn value_type(&self) -> ValueType {
        Key::value_type(self)
    }

    fn has_default(&self) -> bool {
        Key::has_default(self)
    }

    fn default_raw(&self) -> Option<RawValue> {
        self.default_value().map(raw)
    }

    fn has_codec(&self) -> bool {
        Key::has_codec(self)
    }

    fn accepts_raw(&self, value: &(dyn Any + Send + Sync)) -> bool {
        value.is::<T>()
    }

    fn encode_raw(&self, value: &(dyn Any + Send + Sync)) -> KeyResult<String> {
        let value = self.downcast_value(value)?;
        self.encode(value)
    }

    fn decode_raw(&self, encoded: &str) -> KeyResult<RawValue> {
        self.decode(encoded).map(raw)
    }

    fn copy_raw(&self, value: &RawValue) -> KeyResult<RawValue> {
        let typed = self.downcast_value(value.as_ref())?;
        match self.copy_fn() {
            Some(copy) => Ok(raw(copy(typed))),
            None => Ok(Arc::clone(value)),
        }
    }

    fn apply_getter_raw(&self, value: RawValue, store: &Store) -> KeyResult<RawValue> {
        let typed = self.downcast_value(value.as_ref())?;
        match self.custom_getter() {
            Some(getter) => Ok(raw(getter(typed.clone(), store))),
            None => Ok(value),
        }
    }

    fn apply_setter_raw(&self, value: RawValue, store: &Store) -> KeyResult<RawValue> {
        let typed = self.downcast_value(value.as_ref())?;
        match self.custom_setter() {
            Some(setter) => Ok(raw(setter(typed.clone(), store))),
            None => Ok(value),
        }
    }

    fn debug_raw(&self, value: &(dyn Any + Send + Sync)) -> Option<String> {
        value.downcast_ref::<T>().map(|v| format!("{v:?}"))
    }

    fn definition(&self) -> Option<&Arc<StoreDefinition>> {
        Key::definition(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_arc(&self) -> Arc<dyn AnyKey> {
        Arc::new(self.clone())
    }
}

impl dyn AnyKey {
    /// Recover the typed key, if its value type is `T`.
    pub fn downcast<T: KeyValue>(&self) -> Option<Key<T>> {
        self.as_any().downcast_ref::<Key<T>>().cloned()
    }
}

impl PartialEq for dyn AnyKey {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for dyn AnyKey {}

impl fmt::Debug for dyn AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyKey")
            .field("name", &self.name())
            .field("value_type", &self.value_type())
            .field("has_default", &self.has_default())
            .finish()
    }
}

impl fmt::Display for dyn AnyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::render_key(self))
    }
}
