use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::iter::Snapshot;
use crate::memory::MemoryIterator;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// Backend-specific implementation of a document cursor.
///
/// Implementors hold the cursor state; [`DocumentIterator`] wraps them and adds the
/// query operators and cascading release on top.
///
/// Positions outside the document range are legal and simply hold no document.
/// After [`release`](DocumentIteratorProvider::release) navigation returns `false`
/// and accessors fail with `Released`.
pub trait DocumentIteratorProvider<T> {
    /// Moves to the first document. Returns `true` if a document is there.
    fn first(&mut self) -> bool;

    /// Moves to the last document. Returns `true` if a document is there.
    fn last(&mut self) -> bool;

    /// Moves forward one step. Returns `true` if the new position holds a document.
    fn next(&mut self) -> bool;

    /// Moves backward one step. Returns `true` if the new position holds a document.
    fn prev(&mut self) -> bool;

    /// Drops the snapshot and marks the cursor released.
    ///
    /// Returns the iterator this one was derived from, if any, so the caller can
    /// continue the release down the chain.
    fn release(&mut self) -> Option<DocumentIterator<T>>;

    fn is_released(&self) -> bool;

    /// Number of documents in the snapshot; 0 once released.
    fn count(&self) -> usize;

    /// Key at the cursor, `None` when the cursor holds no document.
    fn key(&self) -> Option<String>;

    /// Document at the cursor.
    fn value(&self) -> StoreResult<T>;

    /// Every document in the snapshot, regardless of the cursor.
    fn get_all(&self) -> StoreResult<HashMap<String, T>>;

    /// Every key in the snapshot, in iteration order.
    fn get_all_keys(&self) -> StoreResult<Vec<String>>;

    /// Materializes the full snapshot for the query operators.
    fn snapshot(&mut self) -> StoreResult<Snapshot<T>>;
}

/// A cursor over a point-in-time snapshot of a collection.
///
/// # Purpose
/// `DocumentIterator` is a cheap-to-clone handle; every clone drives the same cursor.
/// It is what [`Collection::iter`](crate::collection::Collection::iter) hands out and
/// what `filter`, `sort` and `sort_keys` return.
///
/// # Chains
/// Every derived iterator keeps a link to the iterator it came from. Calling
/// [`release`](DocumentIterator::release) on any iterator releases it and every
/// iterator before it in the chain, down to the backend cursor at the root.
///
/// # Examples
///
/// ```rust
/// use docstash::collection::Collection;
/// use docstash::memory::MemoryCollection;
///
/// let mut ages = MemoryCollection::new();
/// ages.open().unwrap();
/// ages.put("clive", 21u32).unwrap();
/// ages.put("annie", 32u32).unwrap();
/// ages.put("ben", 50u32).unwrap();
///
/// let adults = ages
///     .iter()
///     .sort_keys(|a, b| a < b).unwrap()
///     .filter(|_, age| *age >= 30).unwrap();
///
/// assert_eq!(adults.get_all_keys().unwrap(), vec!["annie", "ben"]);
/// adults.release();
/// ```
pub struct DocumentIterator<T> {
    inner: Rc<RefCell<dyn DocumentIteratorProvider<T>>>,
}

impl<T> Clone for DocumentIterator<T> {
    fn clone(&self) -> Self {
        DocumentIterator {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Debug for DocumentIterator<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.inner.try_borrow() {
            Ok(inner) => f
                .debug_struct("DocumentIterator")
                .field("count", &inner.count())
                .field("released", &inner.is_released())
                .finish(),
            Err(_) => f.debug_struct("DocumentIterator").finish_non_exhaustive(),
        }
    }
}

impl<T: Clone + 'static> DocumentIterator<T> {
    pub fn new<P: DocumentIteratorProvider<T> + 'static>(provider: P) -> Self {
        DocumentIterator {
            inner: Rc::new(RefCell::new(provider)),
        }
    }

    pub fn first(&self) -> bool {
        self.inner.borrow_mut().first()
    }

    pub fn last(&self) -> bool {
        self.inner.borrow_mut().last()
    }

    pub fn next(&self) -> bool {
        self.inner.borrow_mut().next()
    }

    pub fn prev(&self) -> bool {
        self.inner.borrow_mut().prev()
    }

    /// Releases this iterator and every iterator it was derived from.
    /// Releasing twice is a no-op.
    pub fn release(&self) {
        let mut next = self.inner.borrow_mut().release();
        while let Some(predecessor) = next {
            next = predecessor.inner.borrow_mut().release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.inner.borrow().is_released()
    }

    pub fn count(&self) -> usize {
        self.inner.borrow().count()
    }

    pub fn key(&self) -> Option<String> {
        self.inner.borrow().key()
    }

    pub fn value(&self) -> StoreResult<T> {
        self.inner.borrow().value()
    }

    /// Key and document at the cursor.
    pub fn get(&self) -> StoreResult<(String, T)> {
        let inner = self.inner.borrow();
        if inner.is_released() {
            return Err(StoreError::released());
        }

        match inner.key() {
            Some(key) => {
                let value = inner.value()?;
                Ok((key, value))
            }
            None => Err(StoreError::new(
                "iterator is not positioned on a document",
                ErrorKind::NotFound,
            )),
        }
    }

    pub fn get_all(&self) -> StoreResult<HashMap<String, T>> {
        self.inner.borrow().get_all()
    }

    pub fn get_all_keys(&self) -> StoreResult<Vec<String>> {
        self.inner.borrow().get_all_keys()
    }

    /// Creates an iterator over the documents accepted by `predicate`, in this
    /// iterator's order. This iterator is left untouched.
    pub fn filter<F>(&self, predicate: F) -> StoreResult<DocumentIterator<T>>
    where
        F: Fn(&str, &T) -> bool,
    {
        let snapshot = self.snapshot()?;
        Ok(self.derive(snapshot.filter(predicate)))
    }

    /// Creates an iterator ordered by document with a stable sort driven by `less`.
    pub fn sort<F>(&self, less: F) -> StoreResult<DocumentIterator<T>>
    where
        F: Fn(&T, &T) -> bool,
    {
        let snapshot = self.snapshot()?;
        Ok(self.derive(snapshot.sort_by_value(less)))
    }

    /// Creates an iterator ordered by key with a stable sort driven by `less`.
    pub fn sort_keys<F>(&self, less: F) -> StoreResult<DocumentIterator<T>>
    where
        F: Fn(&str, &str) -> bool,
    {
        let snapshot = self.snapshot()?;
        Ok(self.derive(snapshot.sort_by_key(less)))
    }

    // the borrow ends before any caller closure runs
    fn snapshot(&self) -> StoreResult<Snapshot<T>> {
        self.inner.borrow_mut().snapshot()
    }

    fn derive(&self, snapshot: Snapshot<T>) -> DocumentIterator<T> {
        DocumentIterator::new(MemoryIterator::chained(snapshot, self.clone()))
    }
}
