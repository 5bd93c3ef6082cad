use crate::errors::{ErrorKind, StoreError, StoreResult};

/// Checks whether `key` may be used to store a document.
///
/// Any non-empty string is a valid key. Every write path calls this before touching
/// a marshaler or a backend.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() {
        log::error!("Rejected empty document key");
        return Err(StoreError::new(
            "document key must not be empty",
            ErrorKind::InvalidKey,
        ));
    }
    Ok(())
}
