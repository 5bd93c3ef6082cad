//! The collection contract and key rules shared by every backend.

mod collection;
mod key;

pub use collection::*;
pub use key::*;
