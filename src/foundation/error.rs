/// Crate-wide result alias.
pub type CamagruResult<T> = Result<T, CamagruError>;

/// Top-level error type used by all public APIs.
///
/// Only overlay problems are recovered inside the compositor; everything reported here is
/// fatal to the call that produced it and no output file is left behind.
#[derive(thiserror::Error, Debug)]
pub enum CamagruError {
    /// The primary image could not be read, decoded, or was rejected by a limit.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The final canvas could not be encoded or written.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The destination directory is missing and could not be created.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Caller input or configuration violated a documented constraint.
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of a [`CamagruError`] for callers mapping failures to responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`CamagruError::Decode`].
    DecodeFailed,
    /// See [`CamagruError::Encode`].
    EncodeFailed,
    /// See [`CamagruError::StorageUnavailable`].
    StorageUnavailable,
    /// See [`CamagruError::Validation`].
    Invalid,
    /// See [`CamagruError::Other`].
    Internal,
}

impl CamagruError {
    /// Build [`CamagruError::Decode`].
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build [`CamagruError::Encode`].
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build [`CamagruError::StorageUnavailable`].
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    /// Build [`CamagruError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode(_) => ErrorKind::DecodeFailed,
            Self::Encode(_) => ErrorKind::EncodeFailed,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            Self::Validation(_) => ErrorKind::Invalid,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
