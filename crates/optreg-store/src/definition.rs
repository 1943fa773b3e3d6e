use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::any_key::AnyKey;
use crate::error::{DefinitionError, DefinitionResult};
use crate::key::Key;
use crate::render;
use crate::store::Store;
use crate::value::KeyValue;

/// Ordered, named set of keys a store is expected to hold.
///
/// Order is insertion order and only matters for display and
/// serialization; lookup is by name. Names are unique.
pub struct StoreDefinition {
    name: String,
    keys: Vec<Arc<dyn AnyKey>>,
    index: HashMap<String, usize>,
    sections: Vec<StoreSection>,
}

/// A titled group of keys inside a definition, for front ends that lay
/// keys out in groups.
#[derive(Debug, Clone)]
pub struct StoreSection {
    name: Option<String>,
    keys: Vec<Arc<dyn AnyKey>>,
}

impl StoreSection {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn keys(&self) -> &[Arc<dyn AnyKey>] {
        &self.keys
    }
}

impl StoreDefinition {
    /// A definition with one untitled section holding `keys`.
    pub fn new(name: impl Into<String>, keys: Vec<Arc<dyn AnyKey>>) -> DefinitionResult<Self> {
        Self::from_sections(
            name.into(),
            vec![StoreSection { name: None, keys }],
        )
    }

    pub fn builder(name: impl Into<String>) -> StoreDefinitionBuilder {
        StoreDefinitionBuilder {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    fn from_sections(name: String, sections: Vec<StoreSection>) -> DefinitionResult<Self> {
        let keys: Vec<Arc<dyn AnyKey>> = sections
            .iter()
            .flat_map(|section| section.keys.iter().cloned())
            .collect();
        let mut index = HashMap::with_capacity(keys.len());
        for (position, key) in keys.iter().enumerate() {
            if index.insert(key.name().to_string(), position).is_some() {
                return Err(DefinitionError::DuplicateKey {
                    name: key.name().to_string(),
                });
            }
        }
        Ok(Self {
            name,
            keys,
            index,
            sections,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every key, in declaration order.
    pub fn keys(&self) -> &[Arc<dyn AnyKey>] {
        &self.keys
    }

    pub fn sections(&self) -> &[StoreSection] {
        &self.sections
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn has_key(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The key with the given name.
    pub fn key(&self, name: &str) -> DefinitionResult<&Arc<dyn AnyKey>> {
        self.index
            .get(name)
            .map(|&position| &self.keys[position])
            .ok_or_else(|| DefinitionError::KeyNotFound {
                key: name.to_string(),
                definition: self.name.clone(),
            })
    }

    /// The key with the given name, if it has value type `T`.
    pub fn typed_key<T: KeyValue>(&self, name: &str) -> Option<Key<T>> {
        self.key(name).ok().and_then(|key| key.downcast::<T>())
    }

    /// A store described by this definition, holding every default.
    pub fn default_values(self: &Arc<Self>) -> Store {
        Store::defaults(self)
    }
}

impl fmt::Display for StoreDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render::render_keys(&self.keys))
    }
}

impl fmt::Debug for StoreDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDefinition")
            .field("name", &self.name)
            .field(
                "keys",
                &self.keys.iter().map(|key| key.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for [`StoreDefinition`]. Keys go into the most recently opened
/// section, or an untitled one if none was opened.
#[derive(Debug)]
pub struct StoreDefinitionBuilder {
    name: String,
    sections: Vec<StoreSection>,
}

impl StoreDefinitionBuilder {
    /// Add a typed key.
    pub fn key<T: KeyValue>(self, key: &Key<T>) -> Self {
        self.erased_key(key.erased())
    }

    /// Add an already erased key.
    pub fn erased_key(mut self, key: Arc<dyn AnyKey>) -> Self {
        match self.sections.last_mut() {
            Some(section) => section.keys.push(key),
            None => self.sections.push(StoreSection {
                name: None,
                keys: vec![key],
            }),
        }
        self
    }

    /// Open a titled section; following keys belong to it.
    pub fn section(mut self, name: impl Into<String>) -> Self {
        self.sections.push(StoreSection {
            name: Some(name.into()),
            keys: Vec::new(),
        });
        self
    }

    /// Finish; fails on duplicate key names.
    pub fn build(self) -> DefinitionResult<Arc<StoreDefinition>> {
        StoreDefinition::from_sections(self.name, self.sections).map(Arc::new)
    }
}
