use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use optreg_types::ValueType;
use tracing::debug;

use crate::any_key::AnyKey;
use crate::definition::StoreDefinition;
use crate::error::{StoreError, StoreResult};
use crate::key::Key;
use crate::value::{raw, KeyValue, RawValue};

#[derive(Clone)]
struct Entry {
    key: Arc<dyn AnyKey>,
    value: RawValue,
}

/// Untyped container of values, read and written through typed keys.
///
/// Values are kept by key name. A `get` with a `Key<T>` downcasts the stored
/// value to `T`; the store never compares a key's declared type with the
/// value's type when writing through a typed key, static typing already
/// ties them together. A key reusing another key's name with a different
/// value type reads back a [`StoreError::TypeMismatch`].
///
/// A store is a plain mutable value with no internal locking. `Clone` is
/// shallow (values are shared); use [`Store::copy_of`] for a copy that runs
/// each key's copy function.
#[derive(Clone)]
pub struct Store {
    name: String,
    definition: Option<Arc<StoreDefinition>>,
    values: BTreeMap<String, Entry>,
    strict: bool,
    closed: bool,
}

impl Store {
    /// An empty store without a definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            definition: None,
            values: BTreeMap::new(),
            strict: false,
            closed: false,
        }
    }

    /// An empty store named after, and described by, `definition`.
    pub fn with_definition(definition: Arc<StoreDefinition>) -> Self {
        let mut store = Self::new(definition.name());
        store.definition = Some(definition);
        store
    }

    /// Like [`Store::with_definition`], but writes through keys outside the
    /// definition fail with [`StoreError::UnknownKey`].
    pub fn closed(definition: Arc<StoreDefinition>) -> Self {
        let mut store = Self::with_definition(definition);
        store.closed = true;
        store
    }

    /// A store holding the default of every key in `definition` that has one.
    pub fn defaults(definition: &Arc<StoreDefinition>) -> Self {
        let mut store = Self::with_definition(Arc::clone(definition));
        for key in definition.keys() {
            if let Some(value) = key.default_raw() {
                store.insert(Arc::clone(key), value);
            }
        }
        store
    }

    /// Copy `other`, passing every stored value through its key's copy
    /// function. When `other` has a definition its keys take precedence over
    /// the keys the values were stored with.
    pub fn copy_of(other: &Store) -> StoreResult<Self> {
        let mut values = BTreeMap::new();
        for (name, entry) in &other.values {
            let key = other
                .definition
                .as_ref()
                .and_then(|definition| definition.key(name).ok())
                .cloned()
                .unwrap_or_else(|| Arc::clone(&entry.key));
            let value = key.copy_raw(&entry.value)?;
            values.insert(name.clone(), Entry { key, value });
        }
        debug!(store = %other.name, values = values.len(), "copied store");
        Ok(Self {
            name: other.name.clone(),
            definition: other.definition.clone(),
            values,
            strict: other.strict,
            closed: other.closed,
        })
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared definition, if any.
    pub fn definition(&self) -> Option<&Arc<StoreDefinition>> {
        self.definition.as_ref()
    }

    pub fn set_definition(&mut self, definition: Arc<StoreDefinition>) -> &mut Self {
        self.definition = Some(definition);
        self
    }

    /// In strict mode `get` never falls back to a key's default.
    pub fn set_strict(&mut self, strict: bool) -> &mut Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether a value is stored for `key`. Defaults do not count.
    pub fn has_value<K: AnyKey + ?Sized>(&self, key: &K) -> bool {
        self.has_value_named(key.name())
    }

    pub fn has_value_named(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Names of keys with a stored value, sorted.
    pub fn keys_with_values(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// Stored keys and values, sorted by key name.
    pub fn entries(&self) -> impl Iterator<Item = (&Arc<dyn AnyKey>, &RawValue)> {
        self.values.values().map(|entry| (&entry.key, &entry.value))
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The stored value, else the key's default, passed through the key's
    /// get-interceptor.
    pub fn get<T: KeyValue>(&self, key: &Key<T>) -> StoreResult<T> {
        let value = match self.values.get(key.name()) {
            Some(entry) => self.downcast(key, &entry.value)?,
            None if self.strict => return Err(self.missing(key.name())),
            None => key
                .default_value()
                .ok_or_else(|| self.missing(key.name()))?,
        };
        Ok(key.apply_getter(value, self))
    }

    /// The stored value, if any; defaults are ignored.
    pub fn try_get<T: KeyValue>(&self, key: &Key<T>) -> StoreResult<Option<T>> {
        match self.values.get(key.name()) {
            Some(entry) => {
                let value = self.downcast(key, &entry.value)?;
                Ok(Some(key.apply_getter(value, self)))
            }
            None => Ok(None),
        }
    }

    /// Erased read by name: the stored value, else the default of the
    /// definition's key of that name.
    pub fn get_raw(&self, name: &str) -> StoreResult<RawValue> {
        let (key, value) = match self.values.get(name) {
            Some(entry) => (Arc::clone(&entry.key), Arc::clone(&entry.value)),
            None => {
                let key = self
                    .definition
                    .as_ref()
                    .and_then(|definition| definition.key(name).ok())
                    .filter(|_| !self.strict)
                    .ok_or_else(|| self.missing(name))?;
                let value = key.default_raw().ok_or_else(|| self.missing(name))?;
                (Arc::clone(key), value)
            }
        };
        Ok(key.apply_getter_raw(value, self)?)
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Store `value` under `key`, after the key's set-interceptor.
    pub fn set<T: KeyValue>(&mut self, key: &Key<T>, value: T) -> StoreResult<&mut Self> {
        self.check_known(key.name())?;
        let value = key.apply_setter(value, self);
        self.insert(key.erased(), raw(value));
        Ok(self)
    }

    /// Store `value` only if `key` has no stored value. Returns whether it
    /// was stored.
    pub fn set_if_absent<T: KeyValue>(&mut self, key: &Key<T>, value: T) -> StoreResult<bool> {
        if self.has_value(key) {
            return Ok(false);
        }
        self.set(key, value)?;
        Ok(true)
    }

    /// Store a value for a key that has none yet.
    pub fn add<T: KeyValue>(&mut self, key: &Key<T>, value: T) -> StoreResult<&mut Self> {
        if self.has_value(key) {
            return Err(StoreError::AlreadyPresent {
                key: key.name().to_string(),
                store: self.name.clone(),
            });
        }
        self.set(key, value)
    }

    /// Overwrite the value of a key that already has one.
    pub fn replace<T: KeyValue>(&mut self, key: &Key<T>, value: T) -> StoreResult<&mut Self> {
        if !self.has_value(key) {
            return Err(StoreError::NotPresent {
                key: key.name().to_string(),
                store: self.name.clone(),
            });
        }
        self.set(key, value)
    }

    /// Decode `encoded` with the key's codec and store the result.
    pub fn set_str<T: KeyValue>(&mut self, key: &Key<T>, encoded: &str) -> StoreResult<&mut Self> {
        let value = key.decode(encoded)?;
        self.set(key, value)
    }

    /// Store an erased value. The value must be of the key's static type.
    pub fn set_raw(&mut self, key: &Arc<dyn AnyKey>, value: RawValue) -> StoreResult<&mut Self> {
        self.check_known(key.name())?;
        if !key.accepts_raw(value.as_ref()) {
            return Err(StoreError::TypeMismatch {
                key: key.name().to_string(),
                store: self.name.clone(),
                expected: key.type_name(),
            });
        }
        let value = key.apply_setter_raw(value, self)?;
        self.insert(Arc::clone(key), value);
        Ok(self)
    }

    /// Remove and return the stored value of `key`.
    pub fn remove<T: KeyValue>(&mut self, key: &Key<T>) -> StoreResult<Option<T>> {
        match self.values.remove(key.name()) {
            Some(entry) => self.downcast(key, &entry.value).map(Some),
            None => Ok(None),
        }
    }

    /// Copy every value of `other` into this store, running copy functions.
    ///
    /// A closed store skips values whose key is not in its definition.
    pub fn merge(&mut self, other: &Store) -> StoreResult<&mut Self> {
        for (name, entry) in &other.values {
            if !self.accepts_name(name) {
                debug!(
                    store = %self.name,
                    source = %other.name,
                    key = %name,
                    "skipping key outside closed definition"
                );
                continue;
            }
            let value = entry.key.copy_raw(&entry.value)?;
            self.insert(Arc::clone(&entry.key), value);
        }
        Ok(self)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn insert(&mut self, key: Arc<dyn AnyKey>, value: RawValue) {
        self.values
            .insert(key.name().to_string(), Entry { key, value });
    }

    fn accepts_name(&self, name: &str) -> bool {
        match (&self.definition, self.closed) {
            (Some(definition), true) => definition.has_key(name),
            _ => true,
        }
    }

    fn check_known(&self, name: &str) -> StoreResult<()> {
        if self.accepts_name(name) {
            return Ok(());
        }
        Err(StoreError::UnknownKey {
            key: name.to_string(),
            definition: self
                .definition
                .as_ref()
                .map(|definition| definition.name().to_string())
                .unwrap_or_default(),
        })
    }

    fn downcast<T: KeyValue>(&self, key: &Key<T>, value: &RawValue) -> StoreResult<T> {
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| StoreError::TypeMismatch {
                key: key.name().to_string(),
                store: self.name.clone(),
                expected: ValueType::of::<T>().simple_name(),
            })
    }

    fn missing(&self, key: &str) -> StoreError {
        StoreError::MissingValue {
            key: key.to_string(),
            store: self.name.clone(),
        }
    }

    /// Stored entries, definition order first, then the rest by name.
    fn ordered_entries(&self) -> Vec<&Entry> {
        let mut ordered: Vec<&Entry> = Vec::with_capacity(self.values.len());
        if let Some(definition) = &self.definition {
            ordered.extend(
                definition
                    .keys()
                    .iter()
                    .filter_map(|key| self.values.get(key.name())),
            );
        }
        for (name, entry) in &self.values {
            let in_definition = self
                .definition
                .as_ref()
                .is_some_and(|definition| definition.has_key(name));
            if !in_definition {
                ordered.push(entry);
            }
        }
        ordered
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.name)?;
        for (index, entry) in self.ordered_entries().into_iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            let rendered = entry
                .key
                .debug_raw(entry.value.as_ref())
                .unwrap_or_else(|| "?".to_string());
            write!(f, "{}: {}", entry.key.name(), rendered)?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field(
                "definition",
                &self.definition.as_ref().map(|definition| definition.name()),
            )
            .field("keys", &self.keys_with_values())
            .field("strict", &self.strict)
            .field("closed", &self.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyError;
    use optreg_types::display_codec;

    fn count() -> Key<i32> {
        Key::new("count")
            .with_default_value(0)
            .with_codec(display_codec::<i32>())
    }

    fn title() -> Key<String> {
        Key::new("title")
    }

    fn definition() -> Arc<StoreDefinition> {
        StoreDefinition::builder("settings")
            .key(&count())
            .key(&title())
            .build()
            .unwrap()
    }

    // -----------------------------------------------------------------------
    // Reads and defaults
    // -----------------------------------------------------------------------

    #[test]
    fn get_falls_back_to_default() {
        let store = Store::new("s");
        assert!(!store.has_value(&count()));
        assert_eq!(store.get(&count()).unwrap(), 0);
    }

    #[test]
    fn get_without_value_or_default_fails() {
        let store = Store::new("s");
        assert_eq!(
            store.get(&title()).unwrap_err(),
            StoreError::MissingValue {
                key: "title".into(),
                store: "s".into()
            }
        );
    }

    #[test]
    fn set_then_get() {
        let mut store = Store::new("s");
        store.set(&count(), 5).unwrap().set(&title(), "x".into()).unwrap();
        assert_eq!(store.get(&count()).unwrap(), 5);
        assert_eq!(store.get(&title()).unwrap(), "x");
        assert_eq!(store.keys_with_values(), vec!["count", "title"]);
    }

    #[test]
    fn same_name_other_type_reads_mismatch() {
        let mut store = Store::new("s");
        store.set(&count(), 5).unwrap();
        let imposter: Key<String> = Key::new("count");
        assert!(matches!(
            store.get(&imposter),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn strict_store_ignores_defaults() {
        let mut store = Store::new("s");
        store.set_strict(true);
        assert!(matches!(
            store.get(&count()),
            Err(StoreError::MissingValue { .. })
        ));
    }

    #[test]
    fn try_get_ignores_defaults() {
        let mut store = Store::new("s");
        assert_eq!(store.try_get(&count()).unwrap(), None);
        store.set(&count(), 2).unwrap();
        assert_eq!(store.try_get(&count()).unwrap(), Some(2));
    }

    #[test]
    fn get_raw_uses_definition_default() {
        let store = Store::with_definition(definition());
        let value = store.get_raw("count").unwrap();
        assert_eq!(value.downcast_ref::<i32>(), Some(&0));
        assert!(store.get_raw("title").is_err());
    }

    // -----------------------------------------------------------------------
    // Interceptors
    // -----------------------------------------------------------------------

    #[test]
    fn interceptors_run_on_get_and_set() {
        let key = count()
            .with_custom_setter(|v, _| v.clamp(0, 10))
            .with_custom_getter(|v, _| v * 100);
        let mut store = Store::new("s");
        store.set(&key, 42).unwrap();
        assert_eq!(store.get(&count()).unwrap(), 10);
        assert_eq!(store.get(&key).unwrap(), 1000);
    }

    #[test]
    fn getter_sees_store_context() {
        let scale: Key<i32> = Key::new("scale").with_default_value(3);
        let scale_for_getter = scale.clone();
        let scaled = count().with_custom_getter(move |v, store| {
            v * store.get(&scale_for_getter).unwrap_or(1)
        });
        let mut store = Store::new("s");
        store.set(&scaled, 2).unwrap();
        assert_eq!(store.get(&scaled).unwrap(), 6);
        store.set(&scale, 5).unwrap();
        assert_eq!(store.get(&scaled).unwrap(), 10);
    }

    // -----------------------------------------------------------------------
    // Write variants
    // -----------------------------------------------------------------------

    #[test]
    fn add_and_replace_check_presence() {
        let mut store = Store::new("s");
        assert!(matches!(
            store.replace(&count(), 1),
            Err(StoreError::NotPresent { .. })
        ));
        store.add(&count(), 1).unwrap();
        assert!(matches!(
            store.add(&count(), 2),
            Err(StoreError::AlreadyPresent { .. })
        ));
        store.replace(&count(), 3).unwrap();
        assert_eq!(store.get(&count()).unwrap(), 3);
    }

    #[test]
    fn set_if_absent_keeps_existing() {
        let mut store = Store::new("s");
        assert!(store.set_if_absent(&count(), 1).unwrap());
        assert!(!store.set_if_absent(&count(), 2).unwrap());
        assert_eq!(store.get(&count()).unwrap(), 1);
    }

    #[test]
    fn remove_returns_value() {
        let mut store = Store::new("s");
        store.set(&count(), 9).unwrap();
        assert_eq!(store.remove(&count()).unwrap(), Some(9));
        assert_eq!(store.remove(&count()).unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn set_str_decodes() {
        let mut store = Store::new("s");
        store.set_str(&count(), " 17 ").unwrap();
        assert_eq!(store.get(&count()).unwrap(), 17);
        assert!(matches!(
            store.set_str(&title(), "x"),
            Err(StoreError::Key(KeyError::CodecMissing { .. }))
        ));
    }

    #[test]
    fn set_raw_checks_type() {
        let mut store = Store::new("s");
        let key = count().erased();
        store.set_raw(&key, raw(4_i32)).unwrap();
        assert_eq!(store.get(&count()).unwrap(), 4);
        assert!(matches!(
            store.set_raw(&key, raw("4".to_string())),
            Err(StoreError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn closed_store_rejects_unknown_keys() {
        let mut store = Store::closed(definition());
        store.set(&count(), 1).unwrap();
        let stray: Key<bool> = Key::new("stray");
        assert_eq!(
            store.set(&stray, true).unwrap_err(),
            StoreError::UnknownKey {
                key: "stray".into(),
                definition: "settings".into()
            }
        );
    }

    // -----------------------------------------------------------------------
    // Copy and merge
    // -----------------------------------------------------------------------

    #[test]
    fn copy_of_applies_copy_functions() {
        let tagged = title().with_copy_fn(|v: &String| format!("{v} (copy)"));
        let mut original = Store::new("s");
        original.set(&tagged, "a".into()).unwrap();
        original.set(&count(), 1).unwrap();

        let copy = Store::copy_of(&original).unwrap();
        assert_eq!(copy.get(&title()).unwrap(), "a (copy)");
        assert_eq!(copy.get(&count()).unwrap(), 1);
        assert_eq!(original.get(&title()).unwrap(), "a");
    }

    #[test]
    fn copy_of_prefers_definition_keys() {
        let tagged = title().with_copy_fn(|v: &String| v.to_uppercase());
        let definition = StoreDefinition::builder("d").key(&tagged).build().unwrap();
        let mut original = Store::with_definition(definition);
        original.set(&title(), "abc".into()).unwrap();

        let copy = Store::copy_of(&original).unwrap();
        assert_eq!(copy.get(&title()).unwrap(), "ABC");
        assert_eq!(copy.definition().unwrap().name(), "d");
    }

    #[test]
    fn merge_skips_keys_outside_closed_definition() {
        let mut source = Store::new("source");
        source.set(&count(), 7).unwrap();
        source.set(&Key::<bool>::new("stray"), true).unwrap();

        let mut target = Store::closed(definition());
        target.merge(&source).unwrap();
        assert_eq!(target.get(&count()).unwrap(), 7);
        assert!(!target.has_value_named("stray"));

        let mut open = Store::new("open");
        open.merge(&source).unwrap();
        assert_eq!(open.len(), 2);
    }

    #[test]
    fn defaults_materialise_every_default() {
        let store = Store::defaults(&definition());
        assert!(store.has_value(&count()));
        assert!(!store.has_value(&title()));
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    #[test]
    fn display_follows_definition_order() {
        let definition = StoreDefinition::builder("ordered")
            .key(&title())
            .key(&count())
            .build()
            .unwrap();
        let mut store = Store::with_definition(definition);
        store.set(&count(), 3).unwrap();
        store.set(&title(), "t".into()).unwrap();
        store.set(&Key::<bool>::new("extra"), false).unwrap();
        assert_eq!(
            store.to_string(),
            "ordered [title: \"t\", count: 3, extra: false]"
        );
    }

    #[test]
    fn display_empty_store() {
        assert_eq!(Store::new("empty").to_string(), "empty []");
    }
}
