//! The ways a key learns its value type.
//!
//! A key always has a static value type `T`. What differs is the *reported*
//! type tag, which drives rendering, erased type checks and error messages:
//!
//! - [`Key::new`] reports `T` itself.
//! - [`Key::from_example`] reports the concrete type of an example value,
//!   which also becomes the default.
//! - [`Key::declared`] takes name, type and optional setup from a
//!   [`KeyDeclaration`] impl.
//! - [`Key::undeclared`] reports [`ValueType::Unknown`].

use std::fmt;

use optreg_types::ValueType;

use crate::key::{Key, KeyParts};
use crate::value::KeyValue;

/// How a key's value type tag was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeResolution {
    /// Given explicitly at construction.
    Explicit,
    /// Taken from an example value.
    Example,
    /// Taken from a [`KeyDeclaration`] impl.
    Declared,
    /// Not available; the key reports [`ValueType::Unknown`].
    Unresolved,
}

impl fmt::Display for TypeResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Explicit => "explicit",
            Self::Example => "example",
            Self::Declared => "declared",
            Self::Unresolved => "unresolved",
        };
        f.write_str(s)
    }
}

/// A key described by a type: its name is a constant and its value type is
/// an associated type.
///
/// ```
/// use optreg_store::{Key, KeyDeclaration};
///
/// struct Threads;
///
/// impl KeyDeclaration for Threads {
///     type Value = u32;
///     const NAME: &'static str = "threads";
///
///     fn configure(key: Key<u32>) -> Key<u32> {
///         key.with_default_value(4)
///     }
/// }
///
/// let key = Key::declared::<Threads>();
/// assert_eq!(key.name(), "threads");
/// assert_eq!(key.default_value(), Some(4));
/// ```
pub trait KeyDeclaration {
    type Value: KeyValue;
    const NAME: &'static str;

    /// Hook to add a default, codec or other setup.
    fn configure(key: Key<Self::Value>) -> Key<Self::Value> {
        key
    }
}

impl<T: KeyValue> Key<T> {
    /// A key whose reported type is `T`.
    pub fn new(name: &str) -> Self {
        Self::from_parts(KeyParts::new(
            name,
            ValueType::of::<T>(),
            TypeResolution::Explicit,
        ))
    }

    /// A key whose reported type and default come from `example`.
    ///
    /// The example may be a more concrete type than `T`; the key then
    /// reports the example's type. For instance a
    /// `Key<Cow<'static, [String]>>` built from a `Vec<String>` example
    /// reports `Vec<String>`.
    pub fn from_example<E>(name: &str, example: E) -> Self
    where
        E: KeyValue + Into<T>,
    {
        let key = Self::from_parts(KeyParts::new(
            name,
            ValueType::of::<E>(),
            TypeResolution::Example,
        ));
        key.with_default(move || example.clone().into())
    }

    /// A key built from a [`KeyDeclaration`].
    pub fn declared<D>() -> Self
    where
        D: KeyDeclaration<Value = T>,
    {
        let key = Self::from_parts(KeyParts::new(
            D::NAME,
            ValueType::of::<T>(),
            TypeResolution::Declared,
        ));
        D::configure(key)
    }

    /// A key that does not report its value type.
    ///
    /// Lookups still work through the static type, but erased operations
    /// that need the tag (`Store::set_raw`, rendering, persistence) cannot
    /// check or name it. Prefer the other constructors.
    pub fn undeclared(name: &str) -> Self {
        Self::from_parts(KeyParts::new(
            name,
            ValueType::Unknown,
            TypeResolution::Unresolved,
        ))
    }
}
