use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::iter::{DocumentIterator, DocumentIteratorProvider, Snapshot};
use std::collections::HashMap;
use std::rc::Rc;

const BEFORE_FIRST: isize = -1;

/// Cursor over an in-memory [`Snapshot`].
///
/// The position ranges over `[-1, len]`: `-1` sits before the first document and
/// `len` is the exhausted state after the last one. Neither holds a document.
pub struct MemoryIterator<T> {
    keys: Vec<String>,
    documents: Rc<HashMap<String, T>>,
    position: isize,
    released: bool,
    chain: Option<DocumentIterator<T>>,
}

impl<T> MemoryIterator<T> {
    pub fn new(snapshot: Snapshot<T>) -> Self {
        MemoryIterator {
            keys: snapshot.keys().to_vec(),
            documents: Rc::clone(snapshot.documents()),
            position: BEFORE_FIRST,
            released: false,
            chain: None,
        }
    }

    /// Creates an iterator derived from `predecessor`; releasing it releases the predecessor.
    pub fn chained(snapshot: Snapshot<T>, predecessor: DocumentIterator<T>) -> Self {
        let mut iterator = MemoryIterator::new(snapshot);
        iterator.chain = Some(predecessor);
        iterator
    }

    /// An iterator that is already released.
    pub fn released() -> Self {
        let mut iterator = MemoryIterator::new(Snapshot::empty());
        iterator.released = true;
        iterator
    }

    fn len(&self) -> isize {
        self.keys.len() as isize
    }

    fn current(&self) -> Option<&String> {
        if self.released || self.position < 0 {
            return None;
        }
        self.keys.get(self.position as usize)
    }

    fn has_current(&self) -> bool {
        self.current().is_some()
    }
}

impl<T: Clone> DocumentIteratorProvider<T> for MemoryIterator<T> {
    fn first(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.position = 0;
        self.has_current()
    }

    fn last(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.position = self.len() - 1;
        self.has_current()
    }

    fn next(&mut self) -> bool {
        if self.released {
            return false;
        }
        if self.position < self.len() {
            self.position += 1;
        }
        self.has_current()
    }

    fn prev(&mut self) -> bool {
        if self.released {
            return false;
        }
        if self.position > BEFORE_FIRST {
            self.position -= 1;
        }
        self.has_current()
    }

    fn release(&mut self) -> Option<DocumentIterator<T>> {
        if !self.released {
            log::debug!("releasing iterator over {} documents", self.keys.len());
        }
        self.keys.clear();
        self.documents = Rc::new(HashMap::new());
        self.position = BEFORE_FIRST;
        self.released = true;
        self.chain.take()
    }

    fn is_released(&self) -> bool {
        self.released
    }

    fn count(&self) -> usize {
        self.keys.len()
    }

    fn key(&self) -> Option<String> {
        self.current().cloned()
    }

    fn value(&self) -> StoreResult<T> {
        if self.released {
            return Err(StoreError::released());
        }

        let key = self.current().ok_or_else(|| {
            StoreError::new("iterator is not positioned on a document", ErrorKind::NotFound)
        })?;

        self.documents.get(key).cloned().ok_or_else(|| {
            StoreError::new(&format!("document '{}' not found", key), ErrorKind::NotFound)
        })
    }

    fn get_all(&self) -> StoreResult<HashMap<String, T>> {
        if self.released {
            return Err(StoreError::released());
        }

        Ok(self
            .keys
            .iter()
            .filter_map(|key| self.documents.get(key).map(|doc| (key.clone(), doc.clone())))
            .collect())
    }

    fn get_all_keys(&self) -> StoreResult<Vec<String>> {
        if self.released {
            return Err(StoreError::released());
        }
        Ok(self.keys.clone())
    }

    fn snapshot(&mut self) -> StoreResult<Snapshot<T>> {
        if self.released {
            return Err(StoreError::released());
        }
        Ok(Snapshot::new(self.keys.clone(), Rc::clone(&self.documents)))
    }
}
