//! # docstash fjall adapter
//!
//! Persistent [`Collection`](docstash::collection::Collection) backed by
//! [fjall](https://docs.rs/fjall), an embedded LSM-tree keyspace. Documents are
//! encoded with a [`DocumentMarshaler`](docstash::marshal::DocumentMarshaler) and
//! stored one per key in a single partition.
//!
//! ```rust,no_run
//! use docstash::collection::Collection;
//! use docstash::marshal::BytesMarshaler;
//! use docstash_fjall_adapter::FjallCollection;
//!
//! # fn main() -> Result<(), docstash::errors::StoreError> {
//! let mut blobs = FjallCollection::with_config()
//!     .low_memory_preset()
//!     .db_path("/tmp/blobs")
//!     .build(BytesMarshaler::new());
//!
//! blobs.open()?;
//! blobs.put("logo", vec![0x89, 0x50, 0x4e, 0x47])?;
//! blobs.close()?;
//! # Ok(())
//! # }
//! ```

mod builder;
mod collection;
mod config;
mod iterator;
mod wrapper;

pub use builder::*;
pub use collection::*;
pub use config::*;
pub use iterator::*;
pub use wrapper::{FjallCodecError, FjallCodecResult};
