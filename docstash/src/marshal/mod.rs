mod bytes;
#[cfg(feature = "json")]
mod json;
mod marshaler;

pub use bytes::*;
#[cfg(feature = "json")]
pub use json::*;
pub use marshaler::*;
