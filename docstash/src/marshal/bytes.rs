use crate::errors::StoreResult;
use crate::marshal::DocumentMarshaler;

/// Passes raw byte documents through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesMarshaler;

impl BytesMarshaler {
    pub fn new() -> Self {
        BytesMarshaler
    }
}

impl DocumentMarshaler<Vec<u8>, Vec<u8>> for BytesMarshaler {
    fn factory(&self) -> Vec<u8> {
        Vec::new()
    }

    fn marshal(&self, src: &Vec<u8>) -> StoreResult<Vec<u8>> {
        Ok(src.clone())
    }

    fn unmarshal(&self, src: &Vec<u8>, dest: &mut Vec<u8>) -> StoreResult<()> {
        dest.clear();
        dest.extend_from_slice(src);
        Ok(())
    }
}
