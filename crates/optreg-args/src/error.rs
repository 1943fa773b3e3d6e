use optreg_store::{KeyError, StoreError};

/// Errors from building an argument parser or parsing arguments.
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    /// Two mappings were registered for the same flag.
    #[error("There is already a mapping for flag '{flag}'")]
    DuplicateFlag { flag: String },

    /// The flag is neither `--long` nor `-c`.
    #[error("invalid flag '{flag}': expected '--name' or a single-character '-x'")]
    InvalidFlag { flag: String },

    /// A value flag was requested for a key that cannot decode strings.
    #[error("key '{key}' has no codec and cannot be mapped to flag '{flag}'")]
    NotDecodable { key: String, flag: String },

    /// The command line was rejected.
    #[error("{0}")]
    Parse(String),

    /// A flag value could not be decoded by its key.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// The store rejected a decoded value.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<clap::Error> for ArgsError {
    fn from(error: clap::Error) -> Self {
        Self::Parse(error.render().to_string().trim_end().to_string())
    }
}

/// Result alias for argument parsing.
pub type ArgsResult<T> = Result<T, ArgsError>;
