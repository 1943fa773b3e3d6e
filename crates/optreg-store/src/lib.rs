//! Typed keys over untyped stores.
//!
//! A [`Key<T>`] names one configurable value and carries everything known
//! about it: the value type tag, an optional default, an optional string
//! codec, get/set interceptors, a copy rule, a UI panel hook, a nested
//! definition and a sidecar [`ExtraData`] bag. A [`Store`] holds values by
//! key name without knowing their types; reads and writes go through keys.
//! A [`StoreDefinition`] lists the keys a store is expected to hold.
//!
//! # Key Construction
//!
//! - [`Key::new`] -- value type given explicitly (the reliable default)
//! - [`Key::from_example`] -- value type and default taken from an example value
//! - [`Key::declared`] -- name and type taken from a [`KeyDeclaration`] impl
//! - [`Key::undeclared`] -- value type reported as unknown
//!
//! # Design Rules
//!
//! 1. Keys are immutable. Withers return a new key with one field changed.
//! 2. Key equality and hashing use the name only.
//! 3. A missing value falls back to the key's default; no default is an error.
//! 4. Stores check value types when reading, never when writing through a typed key.
//! 5. Stores have no internal locking. `ExtraData` has a one-way lock.

pub mod any_key;
pub mod definition;
pub mod error;
pub mod extra;
pub mod key;
pub mod panel;
pub mod render;
pub mod store;
pub mod value;
pub mod variant;

// Re-export primary types at crate root for ergonomic imports.
pub use any_key::AnyKey;
pub use definition::{StoreDefinition, StoreDefinitionBuilder, StoreSection};
pub use error::{
    DefinitionError, DefinitionResult, ExtraDataError, ExtraDataResult, KeyError, KeyResult,
    StoreError, StoreResult,
};
pub use extra::ExtraData;
pub use key::{Accessor, CopyFn, DefaultFn, Key};
pub use panel::{Panel, PanelProvider};
pub use render::{render_key, render_keys, MAX_RENDER_DEPTH};
pub use store::Store;
pub use value::{raw, KeyValue, RawValue};
pub use variant::{KeyDeclaration, TypeResolution};

pub use optreg_types::{codec, display_codec, CodecError, StringCodec, ValueType};
