use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use optreg_types::{StringCodec, ValueType};

use crate::any_key::AnyKey;
use crate::definition::StoreDefinition;
use crate::error::{KeyError, KeyResult};
use crate::extra::ExtraData;
use crate::panel::{Panel, PanelProvider};
use crate::render;
use crate::store::Store;
use crate::value::KeyValue;
use crate::variant::TypeResolution;

/// Supplies a fresh default value on every call.
pub type DefaultFn<T> = dyn Fn() -> T + Send + Sync;

/// Get/set interceptor: transforms a value with the store as context.
pub type Accessor<T> = dyn Fn(T, &Store) -> T + Send + Sync;

/// Produces an independent copy of a value when a store is duplicated.
pub type CopyFn<T> = dyn Fn(&T) -> T + Send + Sync;

/// A named, typed handle to one configurable value.
///
/// Keys are immutable. Every `with_*` method returns a new key with exactly
/// one field replaced and leaves `self` untouched; cloning is cheap (one
/// `Arc` bump).
///
/// Equality and hashing use the name alone: two keys with the same name are
/// interchangeable even when their value type, default or codec differ.
/// Keep names unique within a definition.
pub struct Key<T> {
    parts: Arc<KeyParts<T>>,
}

/// Every field a key carries. Variants differ only in how `value_type` and
/// `resolution` were filled in at construction.
pub(crate) struct KeyParts<T> {
    pub(crate) name: Arc<str>,
    pub(crate) value_type: ValueType,
    pub(crate) resolution: TypeResolution,
    pub(crate) default: Option<Arc<DefaultFn<T>>>,
    pub(crate) codec: Option<Arc<dyn StringCodec<T>>>,
    pub(crate) getter: Option<Arc<Accessor<T>>>,
    pub(crate) setter: Option<Arc<Accessor<T>>>,
    pub(crate) panel: Option<Arc<dyn PanelProvider<T>>>,
    pub(crate) label: Option<Arc<str>>,
    pub(crate) definition: Option<Arc<StoreDefinition>>,
    pub(crate) copy_fn: Option<Arc<CopyFn<T>>>,
    pub(crate) extra: Option<Arc<ExtraData>>,
}

impl<T> KeyParts<T> {
    pub(crate) fn new(name: &str, value_type: ValueType, resolution: TypeResolution) -> Self {
        Self {
            name: Arc::from(name),
            value_type,
            resolution,
            default: None,
            codec: None,
            getter: None,
            setter: None,
            panel: None,
            label: None,
            definition: None,
            copy_fn: None,
            extra: None,
        }
    }
}

impl<T> Clone for KeyParts<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            value_type: self.value_type,
            resolution: self.resolution,
            default: self.default.clone(),
            codec: self.codec.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
            panel: self.panel.clone(),
            label: self.label.clone(),
            definition: self.definition.clone(),
            copy_fn: self.copy_fn.clone(),
            extra: self.extra.clone(),
        }
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        Self {
            parts: Arc::clone(&self.parts),
        }
    }
}

impl<T: KeyValue> Key<T> {
    pub(crate) fn from_parts(parts: KeyParts<T>) -> Self {
        Self {
            parts: Arc::new(parts),
        }
    }

    /// Rebuild this key with one or more fields changed. Every wither goes
    /// through here.
    fn rebuild(&self, update: impl FnOnce(&mut KeyParts<T>)) -> Self {
        let mut parts = (*self.parts).clone();
        update(&mut parts);
        Self::from_parts(parts)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// The key's identity.
    pub fn name(&self) -> &str {
        &self.parts.name
    }

    /// Display label; falls back to the name.
    pub fn label(&self) -> &str {
        self.parts.label.as_deref().unwrap_or(&self.parts.name)
    }

    /// Declared value type. May be [`ValueType::Unknown`] for undeclared keys.
    pub fn value_type(&self) -> ValueType {
        self.parts.value_type
    }

    /// Declared value type, or an error if it was never resolved.
    pub fn checked_value_type(&self) -> KeyResult<ValueType> {
        match self.parts.value_type {
            ValueType::Unknown => Err(KeyError::UnresolvedType {
                key: self.name().to_string(),
            }),
            known => Ok(known),
        }
    }

    /// How the value type was determined.
    pub fn resolution(&self) -> TypeResolution {
        self.parts.resolution
    }

    /// Simple name of the declared value type.
    pub fn type_name(&self) -> String {
        self.parts.value_type.simple_name()
    }

    /// A fresh default value, if the key has one.
    pub fn default_value(&self) -> Option<T> {
        self.parts.default.as_ref().map(|supplier| supplier())
    }

    pub fn has_default(&self) -> bool {
        self.parts.default.is_some()
    }

    pub fn codec(&self) -> Option<&dyn StringCodec<T>> {
        self.parts.codec.as_deref()
    }

    pub fn has_codec(&self) -> bool {
        self.parts.codec.is_some()
    }

    pub fn custom_getter(&self) -> Option<&Accessor<T>> {
        self.parts.getter.as_deref()
    }

    pub fn custom_setter(&self) -> Option<&Accessor<T>> {
        self.parts.setter.as_deref()
    }

    pub fn copy_fn(&self) -> Option<&CopyFn<T>> {
        self.parts.copy_fn.as_deref()
    }

    pub fn panel_provider(&self) -> Option<&dyn PanelProvider<T>> {
        self.parts.panel.as_deref()
    }

    /// Nested definition, for keys whose value is itself a store.
    pub fn definition(&self) -> Option<&Arc<StoreDefinition>> {
        self.parts.definition.as_ref()
    }

    /// Sidecar data attached to the key.
    pub fn extra_data(&self) -> Option<&ExtraData> {
        self.parts.extra.as_deref()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Encode a value through the configured codec.
    pub fn encode(&self, value: &T) -> KeyResult<String> {
        let codec = self.require_codec()?;
        Ok(codec.encode(value))
    }

    /// Decode a value through the configured codec.
    pub fn decode(&self, encoded: &str) -> KeyResult<T> {
        let codec = self.require_codec()?;
        codec.decode(encoded).map_err(|source| KeyError::Decode {
            key: self.name().to_string(),
            source,
        })
    }

    fn require_codec(&self) -> KeyResult<&dyn StringCodec<T>> {
        self.codec().ok_or_else(|| KeyError::CodecMissing {
            key: self.name().to_string(),
        })
    }

    /// Copy a value with the configured copy function; without one the value
    /// is returned unchanged (a plain clone).
    pub fn copy(&self, value: &T) -> T {
        match self.copy_fn() {
            Some(copy) => copy(value),
            None => value.clone(),
        }
    }

    /// Build the UI panel for this key over `store`.
    pub fn panel(&self, store: &Store) -> KeyResult<Panel> {
        let provider = self
            .panel_provider()
            .ok_or_else(|| KeyError::PanelMissing {
                key: self.name().to_string(),
                value_type: self.type_name(),
            })?;
        Ok(provider.panel(self, store))
    }

    pub(crate) fn apply_getter(&self, value: T, store: &Store) -> T {
        match self.custom_getter() {
            Some(getter) => getter(value, store),
            None => value,
        }
    }

    pub(crate) fn apply_setter(&self, value: T, store: &Store) -> T {
        match self.custom_setter() {
            Some(setter) => setter(value, store),
            None => value,
        }
    }

    /// Erase the value type, for definitions and other heterogeneous lists.
    pub fn erased(&self) -> Arc<dyn AnyKey> {
        Arc::new(self.clone())
    }

    // -----------------------------------------------------------------------
    // Withers
    // -----------------------------------------------------------------------

    /// Replace the default supplier.
    pub fn with_default<F>(&self, supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let supplier: Arc<DefaultFn<T>> = Arc::new(supplier);
        self.rebuild(|parts| parts.default = Some(supplier))
    }

    /// Default to a clone of `value`.
    pub fn with_default_value(&self, value: T) -> Self {
        self.with_default(move || value.clone())
    }

    /// Default to the decoding of `encoded`. Requires a codec.
    pub fn with_default_str(&self, encoded: &str) -> KeyResult<Self> {
        let value = self.decode(encoded)?;
        Ok(self.with_default_value(value))
    }

    /// Drop the default; lookups without a stored value will fail.
    pub fn without_default(&self) -> Self {
        self.rebuild(|parts| parts.default = None)
    }

    pub fn with_codec<C>(&self, codec: C) -> Self
    where
        C: StringCodec<T> + 'static,
    {
        let codec: Arc<dyn StringCodec<T>> = Arc::new(codec);
        self.rebuild(|parts| parts.codec = Some(codec))
    }

    /// Same key under another name. Changes the key's identity.
    pub fn with_name(&self, name: &str) -> Self {
        let name: Arc<str> = Arc::from(name);
        self.rebuild(|parts| parts.name = name)
    }

    pub fn with_label(&self, label: impl Into<String>) -> Self {
        let label: Arc<str> = Arc::from(label.into());
        self.rebuild(|parts| parts.label = Some(label))
    }

    pub fn with_definition(&self, definition: Arc<StoreDefinition>) -> Self {
        self.rebuild(|parts| parts.definition = Some(definition))
    }

    pub fn with_custom_getter<F>(&self, getter: F) -> Self
    where
        F: Fn(T, &Store) -> T + Send + Sync + 'static,
    {
        let getter: Arc<Accessor<T>> = Arc::new(getter);
        self.rebuild(|parts| parts.getter = Some(getter))
    }

    pub fn with_custom_setter<F>(&self, setter: F) -> Self
    where
        F: Fn(T, &Store) -> T + Send + Sync + 'static,
    {
        let setter: Arc<Accessor<T>> = Arc::new(setter);
        self.rebuild(|parts| parts.setter = Some(setter))
    }

    pub fn with_copy_fn<F>(&self, copy: F) -> Self
    where
        F: Fn(&T) -> T + Send + Sync + 'static,
    {
        let copy: Arc<CopyFn<T>> = Arc::new(copy);
        self.rebuild(|parts| parts.copy_fn = Some(copy))
    }

    pub fn with_panel<P>(&self, provider: P) -> Self
    where
        P: PanelProvider<T> + 'static,
    {
        let provider: Arc<dyn PanelProvider<T>> = Arc::new(provider);
        self.rebuild(|parts| parts.panel = Some(provider))
    }

    pub fn with_extra_data(&self, extra: ExtraData) -> Self {
        let extra = Arc::new(extra);
        self.rebuild(|parts| parts.extra = Some(extra))
    }

    /// Override the declared value type tag.
    ///
    /// Used to replace the concrete type an example-inferred key picked up
    /// with the type callers should see. The resolution becomes `Explicit`.
    pub fn with_value_type(&self, value_type: ValueType) -> Self {
        self.rebuild(|parts| {
            parts.value_type = value_type;
            parts.resolution = if value_type.is_unknown() {
                TypeResolution::Unresolved
            } else {
                TypeResolution::Explicit
            };
        })
    }
}

impl<T, U> PartialEq<Key<U>> for Key<T> {
    fn eq(&self, other: &Key<U>) -> bool {
        self.parts.name == other.parts.name
    }
}

impl<T> Eq for Key<T> {}

impl<T> Hash for Key<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must match `str`'s hash so `Borrow<str>` lookups work.
        (*self.parts.name).hash(state);
    }
}

impl<T> Borrow<str> for Key<T> {
    fn borrow(&self) -> &str {
        &self.parts.name
    }
}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.parts.name)
            .field("value_type", &self.parts.value_type)
            .field("resolution", &self.parts.resolution)
            .field("has_default", &self.parts.default.is_some())
            .field("has_codec", &self.parts.codec.is_some())
            .finish()
    }
}

impl<T: KeyValue> fmt::Display for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::render_key(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_types::{codec, display_codec};
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of<K: Hash>(key: &K) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    #[test]
    fn same_name_different_type_is_equal() {
        let a: Key<String> = Key::new("shared");
        let b: Key<i32> = Key::new("shared").with_default_value(3);
        assert!(a == b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn different_names_are_not_equal() {
        let a: Key<String> = Key::new("left");
        let b: Key<String> = Key::new("right");
        assert!(a != b);
    }

    #[test]
    fn set_lookup_by_name() {
        let keys: HashSet<Key<u8>> = [Key::new("a"), Key::new("b")].into_iter().collect();
        assert!(keys.contains("a"));
        assert!(!keys.contains("c"));
    }

    proptest! {
        #[test]
        fn equality_is_name_only(name in "[a-z.]{0,12}", other in "[a-z.]{0,12}", default in any::<i64>()) {
            let a: Key<i64> = Key::new(&name).with_default_value(default);
            let b: Key<String> = Key::new(&other);
            prop_assert_eq!(a == b, name == other);
            if a == b {
                prop_assert_eq!(hash_of(&a), hash_of(&b));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Withers
    // -----------------------------------------------------------------------

    #[test]
    fn withers_leave_original_untouched() {
        let base: Key<i32> = Key::new("count");
        let with_default = base.with_default_value(7);
        let labelled = with_default.with_label("Count");

        assert!(!base.has_default());
        assert_eq!(with_default.default_value(), Some(7));
        assert_eq!(with_default.label(), "count");
        assert_eq!(labelled.label(), "Count");
        assert_eq!(labelled.default_value(), Some(7));
    }

    #[test]
    fn default_supplier_runs_each_time() {
        let key: Key<Vec<u8>> = Key::new("buf").with_default(Vec::new);
        let mut first = key.default_value().unwrap();
        first.push(1);
        assert_eq!(key.default_value().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn without_default_removes_it() {
        let key: Key<bool> = Key::new("flag").with_default_value(true);
        assert!(!key.without_default().has_default());
    }

    #[test]
    fn default_from_string_requires_codec() {
        let key: Key<i32> = Key::new("n");
        assert_eq!(
            key.with_default_str("4").unwrap_err(),
            KeyError::CodecMissing { key: "n".into() }
        );

        let key = key.with_codec(display_codec::<i32>());
        assert_eq!(key.with_default_str("4").unwrap().default_value(), Some(4));
    }

    // -----------------------------------------------------------------------
    // Codec
    // -----------------------------------------------------------------------

    #[test]
    fn encode_decode_without_codec_fail() {
        let key: Key<i32> = Key::new("n");
        assert!(matches!(key.encode(&1), Err(KeyError::CodecMissing { .. })));
        assert!(matches!(key.decode("1"), Err(KeyError::CodecMissing { .. })));
    }

    #[test]
    fn encode_decode_delegate_to_codec() {
        let key: Key<i32> = Key::new("n").with_codec(display_codec::<i32>());
        assert_eq!(key.encode(&5).unwrap(), "5");
        assert_eq!(key.decode("5").unwrap(), 5);
    }

    #[test]
    fn decode_failure_names_key() {
        let key: Key<i32> = Key::new("n").with_codec(display_codec::<i32>());
        let err = key.decode("five").unwrap_err();
        assert!(err.to_string().contains("'n'"));
    }

    // -----------------------------------------------------------------------
    // Copy
    // -----------------------------------------------------------------------

    #[test]
    fn copy_without_function_is_identity() {
        let key: Key<String> = Key::new("s");
        assert_eq!(key.copy(&"abc".to_string()), "abc");
    }

    #[test]
    fn copy_uses_configured_function() {
        let key: Key<String> = Key::new("s").with_copy_fn(|v: &String| format!("{v}-copy"));
        assert_eq!(key.copy(&"abc".to_string()), "abc-copy");
    }

    // -----------------------------------------------------------------------
    // Panel
    // -----------------------------------------------------------------------

    #[test]
    fn panel_without_provider_names_key_and_type() {
        let key: Key<String> = Key::new("title");
        let err = key.panel(&Store::new("s")).unwrap_err();
        assert_eq!(err.to_string(), "no panel defined for key 'title' of type 'String'");
    }

    #[test]
    fn panel_delegates_to_provider() {
        let key: Key<String> =
            Key::new("title").with_panel(|key: &Key<String>, _store: &Store| {
                Panel::new(format!("editor for {}", key.name()))
            });
        let panel = key.panel(&Store::new("s")).unwrap();
        assert_eq!(panel.downcast_ref::<String>().unwrap(), "editor for title");
    }

    // -----------------------------------------------------------------------
    // Interceptors and rendering
    // -----------------------------------------------------------------------

    #[test]
    fn getter_and_setter_are_stored() {
        let key: Key<i32> = Key::new("n")
            .with_custom_getter(|v, _| v * 2)
            .with_custom_setter(|v, _| v + 1);
        let store = Store::new("s");
        assert_eq!(key.apply_getter(3, &store), 6);
        assert_eq!(key.apply_setter(3, &store), 4);
    }

    #[test]
    fn display_without_and_with_default() {
        let key: Key<String> = Key::new("simpleKey");
        assert_eq!(key.to_string(), "simpleKey (String)");
        let key: Key<i32> = Key::new("count").with_default_value(0);
        assert_eq!(key.to_string(), "count (i32 = 0)");
    }

    #[test]
    fn custom_codec_closures() {
        let key: Key<Vec<String>> = Key::new("list").with_codec(codec(
            |v: &Vec<String>| v.join(";"),
            |s: &str| Ok(s.split(';').map(str::to_string).collect()),
        ));
        assert_eq!(key.encode(&vec!["a".into(), "b".into()]).unwrap(), "a;b");
    }
}
