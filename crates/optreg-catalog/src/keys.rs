//! Factory functions for commonly used keys.
//!
//! Every factory returns an explicit-type key. Where a value kind has an
//! obvious zero value it becomes the default, and a codec is attached
//! wherever a string form makes sense.

use std::path::PathBuf;
use std::sync::Arc;

use num_bigint::BigInt;
use optreg_store::{ExtraData, ExtraDataResult, Key, KeyValue, Store, StoreDefinition};
use optreg_types::{display_codec, ValueType};
use tracing::warn;

use crate::codecs::{
    bool_codec, lenient_number_codec, path_codec, store_codec, string_codec, string_list_codec,
};
use crate::enumeration::{EnumCodec, EnumListCodec, Enumerated};
use crate::paths::resolve_path;

/// Boolean, default `false`.
pub fn boolean(name: &str) -> Key<bool> {
    Key::new(name)
        .with_default_value(false)
        .with_codec(bool_codec())
}

/// String, default empty.
pub fn string(name: &str) -> Key<String> {
    Key::new(name)
        .with_default_value(String::new())
        .with_codec(string_codec())
}

/// String with the given default.
pub fn string_with(name: &str, default: &str) -> Key<String> {
    string(name).with_default_value(default.to_string())
}

/// 32-bit integer. Malformed input decodes to 0.
pub fn integer(name: &str, default: i32) -> Key<i32> {
    Key::new(name)
        .with_default_value(default)
        .with_codec(lenient_number_codec(0_i32))
}

/// 64-bit integer. Malformed input decodes to 0.
pub fn long(name: &str, default: i64) -> Key<i64> {
    Key::new(name)
        .with_default_value(default)
        .with_codec(lenient_number_codec(0_i64))
}

/// 64-bit float.
pub fn double(name: &str, default: f64) -> Key<f64> {
    Key::new(name)
        .with_default_value(default)
        .with_codec(display_codec::<f64>())
}

/// Arbitrary-precision integer, default 0.
pub fn big_integer(name: &str) -> Key<BigInt> {
    Key::new(name)
        .with_default(BigInt::default)
        .with_codec(display_codec::<BigInt>())
}

fn path_key(name: &str) -> Key<PathBuf> {
    Key::new(name)
        .with_default(PathBuf::new)
        .with_codec(path_codec())
        .with_custom_getter(resolve_path)
}

/// File path, default empty. Reads resolve against the store's working folder.
pub fn file(name: &str) -> Key<PathBuf> {
    path_key(name)
}

/// Name of the extra-data entry listing accepted file extensions.
pub const FILE_EXTENSIONS: &str = "file_extensions";

/// Extra-data key holding the extensions a file key accepts.
pub fn file_extensions() -> Key<Vec<String>> {
    Key::new(FILE_EXTENSIONS).with_default(Vec::new)
}

/// File path restricted to the given extensions. The extensions are kept in
/// the key's locked extra data for front ends to use.
pub fn file_with_extensions(name: &str, extensions: &[&str]) -> ExtraDataResult<Key<PathBuf>> {
    let extensions: Vec<String> = extensions.iter().map(|e| e.to_string()).collect();
    let mut extra = ExtraData::new(name);
    extra.set(&file_extensions(), extensions)?.lock();
    Ok(path_key(name).with_extra_data(extra))
}

/// Path that may name a file or a folder.
pub fn path(name: &str) -> Key<PathBuf> {
    path_key(name)
}

/// Folder path, default empty.
pub fn folder(name: &str) -> Key<PathBuf> {
    path_key(name)
}

/// Folder path defaulting to the current directory.
pub fn existing_folder(name: &str) -> Key<PathBuf> {
    path_key(name).with_default(|| PathBuf::from("./"))
}

/// List of strings, default empty.
pub fn string_list(name: &str) -> Key<Vec<String>> {
    Key::new(name)
        .with_default(Vec::new)
        .with_codec(string_list_codec())
}

/// List of strings with the given default items.
pub fn string_list_with(name: &str, defaults: &[&str]) -> Key<Vec<String>> {
    let defaults: Vec<String> = defaults.iter().map(|s| s.to_string()).collect();
    string_list(name).with_default_value(defaults)
}

/// One value of an [`Enumerated`] type, default the first variant.
pub fn enumeration<E: Enumerated>(name: &str) -> Key<E> {
    let key = Key::<E>::new(name).with_codec(EnumCodec::<E>::new());
    match E::variants().first() {
        Some(first) => key.with_default_value(first.clone()),
        None => key,
    }
}

/// Several values of an [`Enumerated`] type, default none.
pub fn enumeration_multi<E: Enumerated>(name: &str) -> Key<Vec<E>> {
    Key::new(name)
        .with_default(Vec::new)
        .with_codec(EnumListCodec::<E>::new())
}

/// Any value type, no default and no codec.
pub fn object<T: KeyValue>(name: &str) -> Key<T> {
    Key::new(name)
}

/// Optional value, default `None`.
pub fn optional<T: KeyValue>(name: &str) -> Key<Option<T>> {
    Key::new(name).with_default_value(None)
}

/// Key whose type and default come from an example value.
pub fn generic<T, E>(name: &str, example: E) -> Key<T>
where
    T: KeyValue,
    E: KeyValue + Into<T>,
{
    Key::from_example(name, example)
}

/// List of values, default empty. Copies are independent vectors.
pub fn list<T: KeyValue>(name: &str) -> Key<Vec<T>> {
    Key::from_example(name, Vec::<T>::new())
        .with_copy_fn(|items: &Vec<T>| items.to_vec())
        .with_value_type(ValueType::of::<Vec<T>>())
}

/// Nested store described by `definition`, default every key's default.
/// Encodes as a JSON object of key name to encoded value.
pub fn data_store(name: &str, definition: Arc<StoreDefinition>) -> Key<Store> {
    let defaults = Arc::clone(&definition);
    Key::new(name)
        .with_definition(Arc::clone(&definition))
        .with_codec(store_codec(definition))
        .with_default(move || defaults.default_values())
        .with_copy_fn(|store: &Store| match Store::copy_of(store) {
            Ok(copy) => copy,
            Err(error) => {
                warn!(store = store.name(), %error, "deep copy failed, sharing values");
                store.clone()
            }
        })
}
