use thiserror::Error;

/// Failures constructing or decoding the data-model types in this crate.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("item id exceeds {max} bytes ({got} given)")]
    IdTooLong { max: usize, got: usize },

    #[error("invalid base64: {0}")]
    InvalidBase64(base64::DecodeError),

    #[error("version must be exactly {expected} bytes ({got} given)")]
    InvalidVersionLength { expected: usize, got: usize },

    #[error("perspective tag must not be empty")]
    EmptyPerspective,
}

impl From<base64::DecodeError> for DataError {
    fn from(e: base64::DecodeError) -> Self { DataError::InvalidBase64(e) }
}
