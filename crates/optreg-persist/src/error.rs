use std::io;

use optreg_store::{KeyError, StoreError};

/// Errors produced while saving or loading stores.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// I/O error while reading or writing a file.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The document could not be serialized or parsed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Saving requires the store to carry a definition.
    #[error("store '{store}' has no definition to persist against")]
    NoDefinition { store: String },

    /// The document was written for another definition.
    #[error("document belongs to definition '{found}', expected '{expected}'")]
    DefinitionMismatch { expected: String, found: String },

    /// The document names a key the definition does not have.
    #[error("key '{key}' is not part of definition '{definition}'")]
    UnknownKey { key: String, definition: String },

    /// A key could not encode or decode its value.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The store rejected a loaded value.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PersistError {
    pub(crate) fn serialization(error: impl std::fmt::Display) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Convenience alias used throughout the persist crate.
pub type PersistResult<T> = Result<T, PersistError>;
