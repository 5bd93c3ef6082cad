mod document_iterator;
mod snapshot;
mod sort;

pub use document_iterator::*;
pub use snapshot::*;
