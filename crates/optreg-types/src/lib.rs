//! Foundation types for optreg.
//!
//! This crate provides the two pieces every other optreg crate builds on:
//! the runtime type tag a key carries for its value, and the string codec
//! contract used to turn typed values into text and back.
//!
//! # Key Types
//!
//! - [`ValueType`] -- Runtime tag for a key's declared value type (or the unknown marker)
//! - [`StringCodec`] -- Encode `T -> String` / decode `&str -> T` contract
//! - [`FnCodec`] -- Codec assembled from a pair of closures
//! - [`CodecError`] -- Failure reported by a codec while decoding

pub mod codec;
pub mod error;
pub mod value_type;

pub use codec::{codec, display_codec, FnCodec, StringCodec};
pub use error::{CodecError, CodecResult};
pub use value_type::ValueType;
