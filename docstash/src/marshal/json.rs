use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::marshal::DocumentMarshaler;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Encodes documents as JSON with `serde_json`.
///
/// The factory builds the empty document that [`unmarshal`](DocumentMarshaler::unmarshal)
/// decodes into; [`JsonMarshaler::new`] uses `T::default()`.
///
/// # Examples
///
/// ```rust
/// use docstash::marshal::{DocumentMarshaler, JsonMarshaler};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
/// struct Student {
///     name: String,
///     age: u32,
/// }
///
/// let marshaler = JsonMarshaler::<Student>::new();
/// let bytes = marshaler.marshal(&Student { name: "ben".into(), age: 50 }).unwrap();
///
/// let mut decoded = marshaler.factory();
/// marshaler.unmarshal(&bytes, &mut decoded).unwrap();
/// assert_eq!(decoded.age, 50);
/// ```
pub struct JsonMarshaler<T> {
    factory: Box<dyn Fn() -> T>,
}

impl<T: Default + 'static> JsonMarshaler<T> {
    pub fn new() -> Self {
        JsonMarshaler {
            factory: Box::new(T::default),
        }
    }
}

impl<T: Default + 'static> Default for JsonMarshaler<T> {
    fn default() -> Self {
        JsonMarshaler::new()
    }
}

impl<T> JsonMarshaler<T> {
    pub fn with_factory<F: Fn() -> T + 'static>(factory: F) -> Self {
        JsonMarshaler {
            factory: Box::new(factory),
        }
    }
}

impl<T: Serialize + DeserializeOwned> DocumentMarshaler<T, Vec<u8>> for JsonMarshaler<T> {
    fn factory(&self) -> T {
        (self.factory)()
    }

    fn marshal(&self, src: &T) -> StoreResult<Vec<u8>> {
        serde_json::to_vec(src).map_err(|err| {
            log::error!("Failed to encode document as JSON: {}", err);
            StoreError::from(err)
        })
    }

    fn unmarshal(&self, src: &Vec<u8>, dest: &mut T) -> StoreResult<()> {
        if src.is_empty() {
            return Err(StoreError::new(
                "cannot decode an empty JSON document",
                ErrorKind::EncodingError,
            ));
        }

        *dest = serde_json::from_slice(src).map_err(|err| {
            log::error!("Failed to decode JSON document: {}", err);
            StoreError::from(err)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Default, Debug, PartialEq, Clone)]
    struct Student {
        name: String,
        age: u32,
    }

    #[test]
    fn test_round_trip_reproduces_document() {
        let marshaler = JsonMarshaler::<Student>::new();
        let ben = Student {
            name: "ben".to_string(),
            age: 50,
        };

        let bytes = marshaler.marshal(&ben).unwrap();
        let mut decoded = marshaler.factory();
        marshaler.unmarshal(&bytes, &mut decoded).unwrap();
        assert_eq!(decoded, ben);
    }

    #[test]
    fn test_marshal_produces_json() {
        let marshaler = JsonMarshaler::<Student>::new();
        let bytes = marshaler
            .marshal(&Student {
                name: "clive".to_string(),
                age: 21,
            })
            .unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"name":"clive","age":21}"#
        );
    }

    #[test]
    fn test_custom_factory() {
        let marshaler = JsonMarshaler::with_factory(|| Student {
            name: "unknown".to_string(),
            age: 0,
        });
        assert_eq!(marshaler.factory().name, "unknown");
    }

    #[test]
    fn test_unmarshal_garbage_is_encoding_error() {
        let marshaler = JsonMarshaler::<Student>::new();
        let mut dest = marshaler.factory();
        let err = marshaler.unmarshal(&b"{not json".to_vec(), &mut dest).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
        assert_eq!(dest, Student::default());
    }

    #[test]
    fn test_unmarshal_empty_is_encoding_error() {
        let marshaler = JsonMarshaler::<Student>::new();
        let mut dest = marshaler.factory();
        let err = marshaler.unmarshal(&Vec::new(), &mut dest).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::EncodingError);
    }
}
