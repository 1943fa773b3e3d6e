use optreg_types::CodecError;

/// Errors raised by a single key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// `encode`/`decode` was called on a key without a codec.
    #[error("no encoder/decoder set for key '{key}'")]
    CodecMissing { key: String },

    /// A panel was requested from a key without a panel provider.
    #[error("no panel defined for key '{key}' of type '{value_type}'")]
    PanelMissing { key: String, value_type: String },

    /// The configured codec rejected the input.
    #[error("failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: CodecError,
    },

    /// An erased value handed to the key is not of the key's value type.
    #[error("value handed to key '{key}' is not a {expected}")]
    TypeMismatch { key: String, expected: String },

    /// The key could not resolve its value type and reports the unknown marker.
    #[error("value type of key '{key}' could not be resolved")]
    UnresolvedType { key: String },
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The operation requires a store definition and the store has none.
    #[error("store '{store}' has no definition")]
    NoDefinition { store: String },

    /// No stored value and no default to fall back on.
    #[error("no value for key '{key}' in store '{store}' and the key has no default")]
    MissingValue { key: String, store: String },

    /// The stored value is not of the type the accessing key expects.
    #[error("value stored under key '{key}' in store '{store}' is not a {expected}")]
    TypeMismatch {
        key: String,
        store: String,
        expected: String,
    },

    /// `add` was called for a key that already has a value.
    #[error("key '{key}' already has a value in store '{store}'")]
    AlreadyPresent { key: String, store: String },

    /// `replace` was called for a key that has no value yet.
    #[error("key '{key}' has no value to replace in store '{store}'")]
    NotPresent { key: String, store: String },

    /// A closed store only accepts keys from its definition.
    #[error("key '{key}' is not part of definition '{definition}'")]
    UnknownKey { key: String, definition: String },

    /// A key-level failure surfaced through the store.
    #[error(transparent)]
    Key(#[from] KeyError),
}

/// Errors from building or querying a store definition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DefinitionError {
    /// Two keys in one definition share a name.
    #[error("Duplicate key name: '{name}'")]
    DuplicateKey { name: String },

    /// Lookup by name failed.
    #[error("Key '{key}' not found in definition '{definition}'")]
    KeyNotFound { key: String, definition: String },
}

/// Errors from the sidecar extra-data bag.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtraDataError {
    /// Mutation attempted after `lock()`.
    #[error("extra data '{name}' is locked")]
    Locked { name: String },

    /// Failure from the backing store.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for key operations.
pub type KeyResult<T> = Result<T, KeyError>;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result alias for definition operations.
pub type DefinitionResult<T> = Result<T, DefinitionError>;

/// Result alias for extra-data operations.
pub type ExtraDataResult<T> = Result<T, ExtraDataError>;
