use crate::errors::StoreResult;

/// Converts documents of type `T1` to and from a backend wire type `T2`.
///
/// Durable backends store bytes; a marshaler is how they learn to turn a document
/// into bytes and back. The two types are independent, so a backend can pick any
/// wire representation.
pub trait DocumentMarshaler<T1, T2> {
    /// Creates an empty document to unmarshal into.
    fn factory(&self) -> T1;

    fn marshal(&self, src: &T1) -> StoreResult<T2>;

    /// Decodes `src` into `dest`, overwriting it.
    fn unmarshal(&self, src: &T2, dest: &mut T1) -> StoreResult<()>;
}
