use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{CodecError, CodecResult};
use crate::value_type::ValueType;

/// Converts a typed value to a string and back.
///
/// Implementations must keep encoding stable under one decode/encode cycle:
/// for every `v` in the codec's domain, `encode(&decode(&encode(v))?)` must
/// equal `encode(v)`.
pub trait StringCodec<T>: Send + Sync {
    /// Encode a value into its string form.
    fn encode(&self, value: &T) -> String;

    /// Decode a value from its string form.
    fn decode(&self, encoded: &str) -> CodecResult<T>;
}

type EncodeFn<T> = dyn Fn(&T) -> String + Send + Sync;
type DecodeFn<T> = dyn Fn(&str) -> CodecResult<T> + Send + Sync;

/// A codec assembled from an encode closure and a decode closure.
pub struct FnCodec<T> {
    encode: Arc<EncodeFn<T>>,
    decode: Arc<DecodeFn<T>>,
}

impl<T> Clone for FnCodec<T> {
    fn clone(&self) -> Self {
        Self {
            encode: Arc::clone(&self.encode),
            decode: Arc::clone(&self.decode),
        }
    }
}

impl<T> fmt::Debug for FnCodec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}

impl<T> StringCodec<T> for FnCodec<T> {
    fn encode(&self, value: &T) -> String {
        (self.encode)(value)
    }

    fn decode(&self, encoded: &str) -> CodecResult<T> {
        (self.decode)(encoded)
    }
}

/// Build a codec from an encode and a decode closure.
pub fn codec<T, E, D>(encode: E, decode: D) -> FnCodec<T>
where
    E: Fn(&T) -> String + Send + Sync + 'static,
    D: Fn(&str) -> CodecResult<T> + Send + Sync + 'static,
{
    FnCodec {
        encode: Arc::new(encode),
        decode: Arc::new(decode),
    }
}

/// Codec for any type with matching `Display` and `FromStr` impls.
///
/// Leading and trailing whitespace is trimmed before parsing.
pub fn display_codec<T>() -> FnCodec<T>
where
    T: Display + FromStr + 'static,
    T::Err: Display,
{
    codec(
        |value: &T| value.to_string(),
        |encoded: &str| {
            encoded.trim().parse::<T>().map_err(|e| {
                CodecError::invalid(encoded, ValueType::of::<T>().simple_name(), e.to_string())
            })
        },
    )
}
