//! Ready-made keys for common value kinds.
//!
//! Each factory returns an explicit-type [`Key`](optreg_store::Key) with a
//! zero-value default where one makes sense and a codec attached:
//!
//! - [`boolean`], [`string`], [`integer`], [`long`], [`double`], [`big_integer`]
//! - [`file`], [`path`], [`folder`] -- normalized paths resolved against the
//!   store's [`working_folder`]
//! - [`string_list`] -- `;`-separated lists
//! - [`enumeration`], [`enumeration_multi`] -- values of an [`Enumerated`] type
//! - [`data_store`] -- nested stores, encoded as JSON
//! - [`object`], [`optional`], [`generic`], [`list`] -- codec-less keys

pub mod codecs;
pub mod enumeration;
pub mod keys;
pub mod paths;

pub use codecs::{
    bool_codec, lenient_number_codec, path_codec, store_codec, string_codec, string_list_codec,
    LIST_SEPARATOR,
};
pub use enumeration::{EnumCodec, EnumListCodec, Enumerated};
pub use keys::{
    big_integer, boolean, data_store, double, enumeration, enumeration_multi, existing_folder,
    file, file_extensions, file_with_extensions, folder, generic, integer, list, long, object,
    optional, path, string, string_list, string_list_with, string_with, FILE_EXTENSIONS,
};
pub use paths::{normalize_path, resolve_path, use_relative_paths, working_folder};

#[cfg(test)]
mod tests {
    use super::*;
    use optreg_store::{Store, StoreDefinition};
    use proptest::prelude::*;

    // -----------------------------------------------------------------------
    // End to end
    // -----------------------------------------------------------------------

    #[test]
    fn count_scenario() {
        let count = integer("count", 0);
        let definition = StoreDefinition::builder("counter").key(&count).build().unwrap();
        let mut store = Store::with_definition(definition);

        assert_eq!(store.get(&count).unwrap(), 0);
        store.set(&count, 5).unwrap();
        assert_eq!(store.get(&count).unwrap(), 5);
        assert_eq!(count.encode(&5).unwrap(), "5");
        assert_eq!(count.decode("5").unwrap(), 5);
    }

    #[test]
    fn mixed_store_copy() {
        let verbose = boolean("verbose");
        let names = string_list_with("names", &["a", "b"]);
        let definition = StoreDefinition::builder("mixed")
            .key(&verbose)
            .key(&names)
            .build()
            .unwrap();

        let mut store = Store::with_definition(definition);
        store.set(&verbose, true).unwrap();
        store.set_str(&names, "x;y;z").unwrap();

        let copy = Store::copy_of(&store).unwrap();
        assert!(copy.get(&verbose).unwrap());
        assert_eq!(copy.get(&names).unwrap(), vec!["x", "y", "z"]);
    }

    // -----------------------------------------------------------------------
    // Codec stability
    // -----------------------------------------------------------------------

    proptest! {
        #[test]
        fn integer_key_codec_is_stable(v in any::<i32>()) {
            let key = integer("n", 0);
            let encoded = key.encode(&v).unwrap();
            let decoded = key.decode(&encoded).unwrap();
            prop_assert_eq!(key.encode(&decoded).unwrap(), encoded);
        }

        #[test]
        fn long_key_codec_is_stable(v in any::<i64>()) {
            let key = long("n", 0);
            let encoded = key.encode(&v).unwrap();
            let decoded = key.decode(&encoded).unwrap();
            prop_assert_eq!(key.encode(&decoded).unwrap(), encoded);
        }

        #[test]
        fn string_key_codec_is_stable(v in ".*") {
            let key = string("s");
            let encoded = key.encode(&v).unwrap();
            let decoded = key.decode(&encoded).unwrap();
            prop_assert_eq!(key.encode(&decoded).unwrap(), encoded);
        }

        #[test]
        fn boolean_key_codec_is_stable(v in any::<bool>()) {
            let key = boolean("b");
            let encoded = key.encode(&v).unwrap();
            prop_assert_eq!(key.decode(&encoded).unwrap(), v);
        }

        #[test]
        fn big_integer_key_codec_is_stable(digits in "-?[1-9][0-9]{0,40}") {
            let key = big_integer("n");
            let value = key.decode(&digits).unwrap();
            prop_assert_eq!(key.encode(&value).unwrap(), digits);
        }

        #[test]
        fn double_key_codec_is_stable(v in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
            let key = double("d", 0.0);
            let encoded = key.encode(&v).unwrap();
            let decoded = key.decode(&encoded).unwrap();
            prop_assert_eq!(key.encode(&decoded).unwrap(), encoded);
        }
    }
}
