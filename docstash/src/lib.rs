//! # docstash - Storage-agnostic document collections
//!
//! docstash gives application code one key→document contract, [`Collection`], and
//! lets the storage behind it change without touching call sites. Documents can live
//! in process memory, in a durable engine through an adapter crate such as
//! `docstash_fjall_adapter`, or in memory layered over a durable engine.
//!
//! ## Key Features
//!
//! - **Uniform contract**: open/close lifecycle plus put, get, has, delete and iter
//! - **Snapshot iterators**: bidirectional cursors over a point-in-time view
//! - **Chainable queries**: `filter`, `sort` and `sort_keys` derive new iterators
//! - **Stable sorting**: documents that compare equal keep their previous order
//! - **Cascading release**: releasing a derived iterator releases its whole chain
//! - **Pluggable marshalers**: JSON and raw-bytes encodings for durable backends
//!
//! ## Quick Start
//!
//! ```rust
//! use docstash::collection::Collection;
//! use docstash::memory::MemoryCollection;
//!
//! # fn main() -> Result<(), docstash::errors::StoreError> {
//! let mut ages = MemoryCollection::new();
//! ages.open()?;
//!
//! ages.put("annie", 32u32)?;
//! ages.put("ben", 50u32)?;
//! ages.put("clive", 21u32)?;
//!
//! let adults = ages
//!     .iter()
//!     .sort_keys(|a, b| a < b)?
//!     .filter(|_, age| *age >= 30)?;
//!
//! while adults.next() {
//!     let (name, age) = adults.get()?;
//!     println!("{name} is {age}");
//! }
//! adults.release();
//!
//! ages.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Design Pattern
//!
//! Iterators follow the **PIMPL (Pointer To IMPLementation)** pattern: a
//! [`DocumentIterator`](iter::DocumentIterator) is a cheap-to-clone handle over a
//! backend-specific [`DocumentIteratorProvider`](iter::DocumentIteratorProvider). The
//! query operators and release chain live on the handle, so every backend gets them
//! for free.
//!
//! Everything is single-threaded. Callers serialize access to a collection.
//!
//! ## Module Organization
//!
//! - [`collection`] - The collection contract and key validation
//! - [`errors`] - Error types and result definitions
//! - [`iter`] - Iterator handle, provider contract and snapshots
//! - [`marshal`] - Document marshalers for durable backends
//! - [`memory`] - In-memory collection and iterator

pub mod collection;
pub mod errors;
pub mod iter;
pub mod marshal;
pub mod memory;

pub use collection::Collection;
pub use errors::{ErrorKind, StoreError, StoreResult};
pub use iter::DocumentIterator;
pub use memory::MemoryCollection;
