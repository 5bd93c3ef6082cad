use docstash::errors::{ErrorKind, StoreError};
use docstash::marshal::DocumentMarshaler;
use fjall::Slice;
use std::error::Error;
use thiserror::Error;

/// Error type for translating between fjall slices and documents.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FjallCodecError {
    /// A stored key is not valid UTF-8
    #[error("Stored key is not valid UTF-8: {0}")]
    InvalidKey(String),
    /// A stored document could not be unmarshaled
    #[error("Failed to decode document '{key}': {message}")]
    DecodeFailed { key: String, message: String },
}

impl From<FjallCodecError> for StoreError {
    fn from(err: FjallCodecError) -> Self {
        StoreError::new(&err.to_string(), ErrorKind::EncodingError)
    }
}

pub type FjallCodecResult<T> = Result<T, FjallCodecError>;

/// Converts an error raised by fjall into a [`StoreError`] carrying fjall's message.
pub(crate) fn to_store_error(error: impl Error) -> StoreError {
    StoreError::new(&format!("Fjall Error: {}", error), ErrorKind::BackendError)
}

pub(crate) fn decode_key(key: &Slice) -> FjallCodecResult<String> {
    String::from_utf8(key.to_vec()).map_err(|err| FjallCodecError::InvalidKey(err.to_string()))
}

/// Unmarshals a stored value into a fresh document from the marshaler's factory.
pub(crate) fn decode_document<T>(
    marshaler: &dyn DocumentMarshaler<T, Vec<u8>>,
    key: &str,
    value: &Slice,
) -> Result<T, StoreError> {
    let mut document = marshaler.factory();
    if let Err(err) = marshaler.unmarshal(&value.to_vec(), &mut document) {
        log::error!("Failed to decode document '{}': {}", key, err);
        let codec_error = FjallCodecError::DecodeFailed {
            key: key.to_string(),
            message: err.message().to_string(),
        };
        return Err(StoreError::new_with_cause(
            &codec_error.to_string(),
            ErrorKind::EncodingError,
            err,
        ));
    }
    Ok(document)
}
