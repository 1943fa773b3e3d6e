use std::collections::BTreeMap;
use std::sync::Arc;

use optreg_store::{Store, StoreDefinition};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{Format, PersistConfig};
use crate::error::{PersistError, PersistResult};

/// Serializable form of a store: the definition name plus every value
/// encoded through its key's codec, ordered by key name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    /// Name of the definition the values belong to.
    pub definition: String,
    /// Key name to encoded value.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

impl StoreDocument {
    /// Encode `store`. Every written value needs a codec.
    pub fn from_store(store: &Store, config: &PersistConfig) -> PersistResult<Self> {
        let definition = store.definition().ok_or_else(|| PersistError::NoDefinition {
            store: store.name().to_string(),
        })?;

        let mut values = BTreeMap::new();
        for (key, value) in store.entries() {
            values.insert(key.name().to_string(), key.encode_raw(value.as_ref())?);
        }

        if !config.skip_defaults {
            for key in definition.keys() {
                if values.contains_key(key.name()) {
                    continue;
                }
                if let Some(default) = key.default_raw() {
                    values.insert(key.name().to_string(), key.encode_raw(default.as_ref())?);
                }
            }
        }

        debug!(
            store = store.name(),
            definition = definition.name(),
            values = values.len(),
            "encoded store document"
        );
        Ok(Self {
            definition: definition.name().to_string(),
            values,
        })
    }

    /// Decode the values into a new store described by `definition`.
    pub fn into_store(
        self,
        definition: &Arc<StoreDefinition>,
        config: &PersistConfig,
    ) -> PersistResult<Store> {
        if self.definition != definition.name() {
            if config.strict_keys {
                return Err(PersistError::DefinitionMismatch {
                    expected: definition.name().to_string(),
                    found: self.definition,
                });
            }
            warn!(
                expected = definition.name(),
                found = %self.definition,
                "document written for another definition"
            );
        }

        let mut store = Store::with_definition(Arc::clone(definition));
        for (name, encoded) in &self.values {
            let Ok(key) = definition.key(name) else {
                if config.strict_keys {
                    return Err(PersistError::UnknownKey {
                        key: name.clone(),
                        definition: definition.name().to_string(),
                    });
                }
                warn!(key = %name, definition = definition.name(), "ignoring unknown key");
                continue;
            };
            let value = key.decode_raw(encoded)?;
            store.set_raw(key, value)?;
        }
        Ok(store)
    }

    /// Render in the given format.
    pub fn render(&self, format: Format) -> PersistResult<String> {
        match format {
            Format::Json => serde_json::to_string_pretty(self).map_err(PersistError::serialization),
            Format::Toml => toml::to_string(self).map_err(PersistError::serialization),
        }
    }

    /// Parse from the given format.
    pub fn parse(text: &str, format: Format) -> PersistResult<Self> {
        match format {
            Format::Json => serde_json::from_str(text).map_err(PersistError::serialization),
            Format::Toml => toml::from_str(text).map_err(PersistError::serialization),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_catalog::{boolean, integer, string, string_list};
    use optreg_store::{Key, KeyError};

    fn definition() -> Arc<StoreDefinition> {
        StoreDefinition::builder("app")
            .key(&integer("threads", 4))
            .key(&string("name"))
            .key(&boolean("verbose"))
            .key(&string_list("tags"))
            .build()
            .unwrap()
    }

    fn populated() -> Store {
        let mut store = Store::with_definition(definition());
        store.set(&integer("threads", 4), 8).unwrap();
        store.set(&string("name"), "demo".into()).unwrap();
        store
    }

    // -----------------------------------------------------------------------
    // Encoding
    // -----------------------------------------------------------------------

    #[test]
    fn only_stored_values_by_default() {
        let doc = StoreDocument::from_store(&populated(), &PersistConfig::default()).unwrap();
        assert_eq!(doc.definition, "app");
        assert_eq!(doc.values.len(), 2);
        assert_eq!(doc.values["threads"], "8");
        assert_eq!(doc.values["name"], "demo");
    }

    #[test]
    fn defaults_included_on_request() {
        let config = PersistConfig {
            skip_defaults: false,
            ..PersistConfig::default()
        };
        let doc = StoreDocument::from_store(&populated(), &config).unwrap();
        assert_eq!(doc.values["verbose"], "false");
        assert_eq!(doc.values["tags"], "");
        assert_eq!(doc.values["threads"], "8");
    }

    #[test]
    fn store_without_definition_is_rejected() {
        let err = StoreDocument::from_store(&Store::new("bare"), &PersistConfig::default())
            .unwrap_err();
        assert!(matches!(err, PersistError::NoDefinition { .. }));
    }

    #[test]
    fn value_without_codec_fails() {
        let opaque: Key<u8> = Key::new("opaque");
        let definition = StoreDefinition::builder("d").key(&opaque).build().unwrap();
        let mut store = Store::with_definition(definition);
        store.set(&opaque, 1).unwrap();
        let err = StoreDocument::from_store(&store, &PersistConfig::default()).unwrap_err();
        assert!(matches!(err, PersistError::Key(KeyError::CodecMissing { .. })));
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    #[test]
    fn into_store_decodes_through_definition() {
        let doc = StoreDocument::from_store(&populated(), &PersistConfig::default()).unwrap();
        let store = doc.into_store(&definition(), &PersistConfig::default()).unwrap();
        assert_eq!(store.get(&integer("threads", 4)).unwrap(), 8);
        assert_eq!(store.get(&string("name")).unwrap(), "demo");
        assert!(!store.has_value(&boolean("verbose")));
    }

    #[test]
    fn unknown_keys_skipped_unless_strict() {
        let mut doc = StoreDocument {
            definition: "app".into(),
            values: BTreeMap::new(),
        };
        doc.values.insert("ghost".into(), "1".into());
        doc.values.insert("threads".into(), "2".into());

        let store = doc
            .clone()
            .into_store(&definition(), &PersistConfig::default())
            .unwrap();
        assert_eq!(store.len(), 1);

        let strict = PersistConfig {
            strict_keys: true,
            ..PersistConfig::default()
        };
        let err = doc.into_store(&definition(), &strict).unwrap_err();
        assert!(matches!(err, PersistError::UnknownKey { ref key, .. } if key == "ghost"));
    }

    #[test]
    fn definition_mismatch_only_fails_when_strict() {
        let doc = StoreDocument {
            definition: "other".into(),
            values: BTreeMap::new(),
        };
        assert!(doc
            .clone()
            .into_store(&definition(), &PersistConfig::default())
            .is_ok());
        let strict = PersistConfig {
            strict_keys: true,
            ..PersistConfig::default()
        };
        assert!(matches!(
            doc.into_store(&definition(), &strict),
            Err(PersistError::DefinitionMismatch { .. })
        ));
    }

    // -----------------------------------------------------------------------
    // Formats
    // -----------------------------------------------------------------------

    #[test]
    fn toml_layout() {
        let doc = StoreDocument::from_store(&populated(), &PersistConfig::default()).unwrap();
        let text = doc.render(Format::Toml).unwrap();
        assert!(text.starts_with("definition = \"app\""));
        assert!(text.contains("[values]"));
        assert!(text.contains("threads = \"8\""));
        assert_eq!(StoreDocument::parse(&text, Format::Toml).unwrap(), doc);
    }

    #[test]
    fn json_layout() {
        let doc = StoreDocument::from_store(&populated(), &PersistConfig::default()).unwrap();
        let text = doc.render(Format::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed["definition"], "app");
        assert_eq!(parsed["values"]["threads"], "8");
        assert_eq!(StoreDocument::parse(&text, Format::Json).unwrap(), doc);
    }

    #[test]
    fn malformed_input_is_a_serialization_error() {
        assert!(matches!(
            StoreDocument::parse("{not json", Format::Json),
            Err(PersistError::Serialization(_))
        ));
        assert!(matches!(
            StoreDocument::parse("definition = ", Format::Toml),
            Err(PersistError::Serialization(_))
        ));
    }
}
