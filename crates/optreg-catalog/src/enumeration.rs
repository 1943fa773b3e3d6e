use std::marker::PhantomData;

use optreg_store::KeyValue;
use optreg_types::{CodecError, CodecResult, StringCodec, ValueType};

use crate::codecs::{join_list, split_list};

/// A closed set of values usable with [`enumeration`](crate::enumeration)
/// keys.
///
/// ```
/// use optreg_catalog::Enumerated;
///
/// #[derive(Debug, Clone, Copy, PartialEq)]
/// enum Level {
///     Low,
///     High,
/// }
///
/// impl Enumerated for Level {
///     fn variants() -> &'static [Self] {
///         &[Level::Low, Level::High]
///     }
/// }
///
/// assert_eq!(Level::High.encoded(), "High");
/// ```
pub trait Enumerated: KeyValue + PartialEq {
    /// Every value, in declaration order. The first one is the default.
    fn variants() -> &'static [Self];

    /// String form of a value. Must be distinct per variant.
    fn encoded(&self) -> String {
        format!("{self:?}")
    }
}

/// Codec for an [`Enumerated`] type, matching on [`Enumerated::encoded`].
pub struct EnumCodec<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> EnumCodec<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for EnumCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Enumerated> StringCodec<E> for EnumCodec<E> {
    fn encode(&self, value: &E) -> String {
        value.encoded()
    }

    fn decode(&self, encoded: &str) -> CodecResult<E> {
        decode_variant(encoded)
    }
}

/// Codec for a list of [`Enumerated`] values, `;`-separated.
pub struct EnumListCodec<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> EnumListCodec<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for EnumListCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Enumerated> StringCodec<Vec<E>> for EnumListCodec<E> {
    fn encode(&self, value: &Vec<E>) -> String {
        let items: Vec<String> = value.iter().map(Enumerated::encoded).collect();
        join_list(&items)
    }

    fn decode(&self, encoded: &str) -> CodecResult<Vec<E>> {
        split_list(encoded)
            .iter()
            .map(|item| decode_variant(item))
            .collect()
    }
}

fn decode_variant<E: Enumerated>(encoded: &str) -> CodecResult<E> {
    let wanted = encoded.trim();
    E::variants()
        .iter()
        .find(|variant| variant.encoded() == wanted)
        .cloned()
        .ok_or_else(|| {
            let expected: Vec<String> = E::variants().iter().map(Enumerated::encoded).collect();
            CodecError::invalid(
                encoded,
                ValueType::of::<E>().simple_name(),
                format!("expected one of: {}", expected.join(", ")),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Mode {
        Fast,
        Safe,
    }

    impl Enumerated for Mode {
        fn variants() -> &'static [Self] {
            &[Mode::Fast, Mode::Safe]
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Lowercase {
        First,
        Second,
    }

    impl Enumerated for Lowercase {
        fn variants() -> &'static [Self] {
            &[Lowercase::First, Lowercase::Second]
        }

        fn encoded(&self) -> String {
            format!("{self:?}").to_lowercase()
        }
    }

    #[test]
    fn encodes_variant_name() {
        assert_eq!(EnumCodec::<Mode>::new().encode(&Mode::Safe), "Safe");
    }

    #[test]
    fn decodes_every_variant() {
        let c = EnumCodec::<Mode>::new();
        for variant in Mode::variants() {
            assert_eq!(&c.decode(&variant.encoded()).unwrap(), variant);
        }
    }

    #[test]
    fn custom_encoding_is_used_both_ways() {
        let c = EnumCodec::<Lowercase>::new();
        assert_eq!(c.encode(&Lowercase::First), "first");
        assert_eq!(c.decode("second").unwrap(), Lowercase::Second);
        assert!(c.decode("Second").is_err());
    }

    #[test]
    fn unknown_name_lists_choices() {
        let err = EnumCodec::<Mode>::new().decode("Slow").unwrap_err();
        assert!(err.to_string().contains("expected one of: Fast, Safe"));
    }

    #[test]
    fn list_codec() {
        let c = EnumListCodec::<Mode>::new();
        assert_eq!(c.encode(&vec![Mode::Safe, Mode::Fast]), "Safe;Fast");
        assert_eq!(c.decode("Fast;Safe").unwrap(), vec![Mode::Fast, Mode::Safe]);
        assert!(c.decode("").unwrap().is_empty());
    }
}
