use crate::errors::StoreResult;
use crate::iter::DocumentIterator;

/// A key-value store for documents of type `T`.
///
/// # Purpose
/// `Collection` is the contract application code programs against. The in-memory
/// [`MemoryCollection`](crate::memory::MemoryCollection) and durable adapters such as
/// the fjall-backed collection all implement it, so a backend can be swapped without
/// changing call sites.
///
/// # Lifecycle
/// A collection starts closed. Every operation except [`open`](Collection::open)
/// fails with [`ErrorKind::Closed`](crate::errors::ErrorKind::Closed) until it is
/// opened, and again after [`close`](Collection::close).
///
/// # Ordering
/// The order in which [`iter`](Collection::iter) visits documents is not specified by
/// the contract. Apply `sort` or `sort_keys` on the iterator for a deterministic order.
pub trait Collection<T> {
    /// Opens the collection.
    fn open(&mut self) -> StoreResult<()>;

    /// Closes the collection.
    fn close(&mut self) -> StoreResult<()>;

    /// Deletes a document by key. Deleting an absent key is not an error.
    fn delete(&mut self, key: &str) -> StoreResult<()>;

    /// Gets a document by key.
    ///
    /// # Errors
    /// * `NotFound` if no document is stored under `key`
    /// * `Closed` if the collection is not open
    fn get(&self, key: &str) -> StoreResult<T>;

    /// Checks whether a document exists by key.
    fn has(&self, key: &str) -> StoreResult<bool>;

    /// Puts a document into the collection, replacing any document stored under `key`.
    ///
    /// # Errors
    /// * `InvalidKey` if `key` is empty; nothing is written
    /// * `Closed` if the collection is not open
    fn put(&mut self, key: &str, value: T) -> StoreResult<()>;

    /// Gets an iterator over a snapshot of this collection.
    fn iter(&self) -> DocumentIterator<T>;
}

impl<T, C: Collection<T> + ?Sized> Collection<T> for Box<C> {
    fn open(&mut self) -> StoreResult<()> {
        (**self).open()
    }

    fn close(&mut self) -> StoreResult<()> {
        (**self).close()
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn get(&self, key: &str) -> StoreResult<T> {
        (**self).get(key)
    }

    fn has(&self, key: &str) -> StoreResult<bool> {
        (**self).has(key)
    }

    fn put(&mut self, key: &str, value: T) -> StoreResult<()> {
        (**self).put(key, value)
    }

    fn iter(&self) -> DocumentIterator<T> {
        (**self).iter()
    }
}
