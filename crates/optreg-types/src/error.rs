use thiserror::Error;

/// Errors produced while decoding a string into a typed value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input is not a valid encoding of the target type.
    #[error("cannot decode '{input}' as {target}: {reason}")]
    Invalid {
        input: String,
        target: String,
        reason: String,
    },

    /// Any other codec-specific failure.
    #[error("codec error: {0}")]
    Other(String),
}

impl CodecError {
    /// Build an [`CodecError::Invalid`] for the given input and target type name.
    pub fn invalid(
        input: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Invalid {
            input: input.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
