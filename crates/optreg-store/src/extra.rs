use crate::error::{ExtraDataError, ExtraDataResult};
use crate::key::Key;
use crate::store::Store;
use crate::value::KeyValue;

/// Sidecar value bag attached to a key.
///
/// Mutable until [`lock`](ExtraData::lock) is called, read-only afterwards.
/// Every mutator on a locked bag fails with [`ExtraDataError::Locked`] and
/// leaves the contents untouched. There is no unlock.
#[derive(Debug, Clone)]
pub struct ExtraData {
    store: Store,
    locked: bool,
}

impl ExtraData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            store: Store::new(name),
            locked: false,
        }
    }

    pub fn name(&self) -> &str {
        self.store.name()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Freeze the bag.
    pub fn lock(&mut self) -> &mut Self {
        self.locked = true;
        self
    }

    pub fn set<T: KeyValue>(&mut self, key: &Key<T>, value: T) -> ExtraDataResult<&mut Self> {
        self.ensure_unlocked()?;
        self.store.set(key, value)?;
        Ok(self)
    }

    /// Copy every value of `other` into this bag. All or nothing.
    pub fn set_all(&mut self, other: &ExtraData) -> ExtraDataResult<&mut Self> {
        self.ensure_unlocked()?;
        let mut merged = self.store.clone();
        merged.merge(&other.store)?;
        self.store = merged;
        Ok(self)
    }

    pub fn remove<T: KeyValue>(&mut self, key: &Key<T>) -> ExtraDataResult<Option<T>> {
        self.ensure_unlocked()?;
        Ok(self.store.remove(key)?)
    }

    pub fn get<T: KeyValue>(&self, key: &Key<T>) -> ExtraDataResult<T> {
        Ok(self.store.get(key)?)
    }

    pub fn has_value<T: KeyValue>(&self, key: &Key<T>) -> bool {
        self.store.has_value(key)
    }

    /// Read-only view of the backing store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    fn ensure_unlocked(&self) -> ExtraDataResult<()> {
        if self.locked {
            return Err(ExtraDataError::Locked {
                name: self.store.name().to_string(),
            });
        }
        Ok(())
    }
}
