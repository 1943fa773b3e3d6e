//! Codecs the catalogue attaches to its keys.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use optreg_store::{Store, StoreDefinition};
use optreg_types::{codec, CodecError, FnCodec, ValueType};
use tracing::warn;

use crate::paths::{normalize_path, path_to_string};

/// Separator between items of an encoded string list.
pub const LIST_SEPARATOR: char = ';';

/// `true` (any case) decodes to `true`; everything else to `false`.
pub fn bool_codec() -> FnCodec<bool> {
    codec(
        |value: &bool| value.to_string(),
        |encoded: &str| Ok(encoded.trim().eq_ignore_ascii_case("true")),
    )
}

/// Identity codec.
pub fn string_codec() -> FnCodec<String> {
    codec(|value: &String| value.clone(), |encoded: &str| Ok(encoded.to_string()))
}

/// Number codec that decodes malformed input to `fallback` instead of
/// failing. The substitution is logged.
pub fn lenient_number_codec<T>(fallback: T) -> FnCodec<T>
where
    T: Display + FromStr + Clone + Send + Sync + 'static,
{
    codec(
        |value: &T| value.to_string(),
        move |encoded: &str| match encoded.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(
                    input = encoded,
                    target = %ValueType::of::<T>(),
                    fallback = %fallback,
                    "could not parse number, using fallback"
                );
                Ok(fallback.clone())
            }
        },
    )
}

/// Path codec. Both directions normalize the path and use `/` separators.
pub fn path_codec() -> FnCodec<PathBuf> {
    codec(
        |value: &PathBuf| path_to_string(&normalize_path(value)),
        |encoded: &str| Ok(normalize_path(&PathBuf::from(encoded.trim()))),
    )
}

/// `;`-separated list. The empty string is the empty list.
pub fn string_list_codec() -> FnCodec<Vec<String>> {
    codec(
        |value: &Vec<String>| join_list(value),
        |encoded: &str| Ok(split_list(encoded)),
    )
}

pub(crate) fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    let mut out = String::new();
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            out.push(LIST_SEPARATOR);
        }
        out.push_str(item.as_ref());
    }
    out
}

pub(crate) fn split_list(encoded: &str) -> Vec<String> {
    if encoded.is_empty() {
        return Vec::new();
    }
    encoded.split(LIST_SEPARATOR).map(str::to_string).collect()
}

/// Nested store codec: a JSON object mapping key names to the encodings of
/// their values. Decoding goes through `definition`'s keys; values whose key
/// has no codec are left out when encoding.
pub fn store_codec(definition: Arc<StoreDefinition>) -> FnCodec<Store> {
    codec(
        |store: &Store| encode_store(store),
        move |encoded: &str| decode_store(&definition, encoded),
    )
}

fn encode_store(store: &Store) -> String {
    let mut map = BTreeMap::new();
    for (key, value) in store.entries() {
        match key.encode_raw(value.as_ref()) {
            Ok(encoded) => {
                map.insert(key.name().to_string(), encoded);
            }
            Err(error) => {
                warn!(store = store.name(), key = key.name(), %error, "leaving value out of encoded store");
            }
        }
    }
    serde_json::to_string(&map).unwrap_or_else(|_| "{}".to_string())
}

fn decode_store(definition: &Arc<StoreDefinition>, encoded: &str) -> Result<Store, CodecError> {
    let map: BTreeMap<String, String> = serde_json::from_str(encoded)
        .map_err(|e| CodecError::invalid(encoded, "Store", e.to_string()))?;

    let mut store = Store::with_definition(Arc::clone(definition));
    for (name, value) in &map {
        let key = definition
            .key(name)
            .map_err(|e| CodecError::Other(e.to_string()))?;
        let value = key
            .decode_raw(value)
            .map_err(|e| CodecError::Other(e.to_string()))?;
        store
            .set_raw(key, value)
            .map_err(|e| CodecError::Other(e.to_string()))?;
    }
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_store::Key;
    use optreg_types::{display_codec, StringCodec};
    use proptest::prelude::*;

    #[test]
    fn bool_decoding_is_lenient() {
        let c = bool_codec();
        assert!(c.decode("TRUE").unwrap());
        assert!(c.decode(" true ").unwrap());
        assert!(!c.decode("yes").unwrap());
        assert_eq!(c.encode(&false), "false");
    }

    #[test]
    fn lenient_number_falls_back() {
        let c = lenient_number_codec(0_i32);
        assert_eq!(c.decode("12").unwrap(), 12);
        assert_eq!(c.decode("twelve").unwrap(), 0);
    }

    #[test]
    fn string_list_uses_semicolons() {
        let c = string_list_codec();
        let list = vec!["value1".to_string(), "value2".into(), "value3".into()];
        assert_eq!(c.encode(&list), "value1;value2;value3");
        assert_eq!(c.decode("value1;value2;value3").unwrap(), list);
        assert_eq!(c.encode(&Vec::new()), "");
        assert!(c.decode("").unwrap().is_empty());
    }

    #[test]
    fn path_codec_normalizes() {
        let c = path_codec();
        assert_eq!(c.decode("a/./b/../c.txt").unwrap(), PathBuf::from("a/c.txt"));
        assert_eq!(c.encode(&PathBuf::from("dir/./file.txt")), "dir/file.txt");
        assert_eq!(c.decode("").unwrap(), PathBuf::new());
    }

    #[test]
    fn store_codec_encodes_json_map() {
        let width: Key<u32> = Key::new("width").with_codec(display_codec::<u32>());
        let title: Key<String> = Key::new("title").with_codec(string_codec());
        let definition = StoreDefinition::builder("window")
            .key(&width)
            .key(&title)
            .build()
            .unwrap();

        let mut store = Store::with_definition(Arc::clone(&definition));
        store.set(&width, 80).unwrap().set(&title, "main".into()).unwrap();

        let c = store_codec(definition);
        let encoded = c.encode(&store);
        assert_eq!(encoded, r#"{"title":"main","width":"80"}"#);

        let decoded = c.decode(&encoded).unwrap();
        assert_eq!(decoded.get(&width).unwrap(), 80);
        assert_eq!(decoded.get(&title).unwrap(), "main");
    }

    #[test]
    fn store_codec_rejects_unknown_names() {
        let definition = StoreDefinition::builder("empty").build().unwrap();
        let err = store_codec(definition).decode(r#"{"nope":"1"}"#).unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    proptest! {
        #[test]
        fn string_list_encoding_is_stable(items in proptest::collection::vec("[a-z;]{0,6}", 0..5)) {
            let c = string_list_codec();
            let encoded = c.encode(&items);
            let decoded = c.decode(&encoded).unwrap();
            prop_assert_eq!(c.encode(&decoded), encoded);
        }

        #[test]
        fn path_encoding_is_stable(parts in proptest::collection::vec("[a-z]{1,4}|\\.|\\.\\.", 0..6)) {
            let c = path_codec();
            let path: PathBuf = parts.iter().collect();
            let encoded = c.encode(&path);
            let decoded = c.decode(&encoded).unwrap();
            prop_assert_eq!(c.encode(&decoded), encoded);
        }
    }
}
