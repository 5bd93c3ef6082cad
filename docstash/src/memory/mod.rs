mod collection;
mod iterator;

pub use collection::*;
pub use iterator::*;
