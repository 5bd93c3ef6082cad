use crate::collection::{validate_key, Collection};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::iter::{DocumentIterator, Snapshot};
use crate::memory::MemoryIterator;
use std::collections::HashMap;

/// A [`Collection`] held in a hash map.
///
/// # Purpose
/// `MemoryCollection` keeps every document in process memory. On its own it is a
/// scratch store whose contents vanish on [`close`](Collection::close). Layered over
/// another collection with [`MemoryCollection::layered`] it becomes a read cache over a
/// durable backend: writes go to the backend first, and `open` reloads the whole
/// backend into memory.
///
/// # Characteristics
/// - **Write-through**: a backend failure aborts the write before the map is touched
/// - **Clone on read**: `get` and iterators hand out clones of stored documents. For a
///   shared-handle document type such as `Rc<RefCell<_>>` the clone aliases the stored
///   instance, so mutating it in place changes what the collection holds
/// - **Unordered**: [`iter`](Collection::iter) visits documents in no particular order
///
/// # Examples
///
/// ```rust
/// use docstash::collection::Collection;
/// use docstash::memory::MemoryCollection;
///
/// let mut collection = MemoryCollection::new();
/// collection.open().unwrap();
/// collection.put("ben", 50u32).unwrap();
/// assert_eq!(collection.get("ben").unwrap(), 50);
/// collection.close().unwrap();
/// ```
pub struct MemoryCollection<T> {
    backend: Option<Box<dyn Collection<T>>>,
    documents: HashMap<String, T>,
    open: bool,
}

impl<T: Clone + 'static> MemoryCollection<T> {
    /// Creates a closed, unbacked collection.
    pub fn new() -> Self {
        MemoryCollection {
            backend: None,
            documents: HashMap::new(),
            open: false,
        }
    }

    /// Creates a closed collection that writes through to `backend` and reloads from
    /// it on open.
    pub fn layered<C: Collection<T> + 'static>(backend: C) -> Self {
        MemoryCollection {
            backend: Some(Box::new(backend)),
            documents: HashMap::new(),
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::closed())
        }
    }

    fn reload(&mut self) -> StoreResult<()> {
        let Some(backend) = self.backend.as_mut() else {
            self.documents.clear();
            return Ok(());
        };

        backend.open()?;

        let iterator = backend.iter();
        let loaded = iterator.get_all();
        iterator.release();

        match loaded {
            Ok(documents) => {
                log::debug!("reloaded {} documents from backend", documents.len());
                self.documents = documents;
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to reload documents from backend: {}", err);
                // the collection stays closed, so the backend must not stay open behind it
                if let Err(close_err) = backend.close() {
                    log::error!("Failed to close backend after reload failure: {}", close_err);
                }
                Err(err)
            }
        }
    }
}

impl<T: Clone + 'static> Default for MemoryCollection<T> {
    fn default() -> Self {
        MemoryCollection::new()
    }
}

impl<T: Clone + 'static> Collection<T> for MemoryCollection<T> {
    fn open(&mut self) -> StoreResult<()> {
        self.reload()?;
        self.open = true;
        log::debug!("memory collection opened");
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        // local state is dropped even when the backend refuses to close
        self.documents.clear();
        self.open = false;

        if let Some(backend) = self.backend.as_mut() {
            backend.close()?;
        }
        log::debug!("memory collection closed");
        Ok(())
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.ensure_open()?;

        if let Some(backend) = self.backend.as_mut() {
            backend.delete(key)?;
        }
        self.documents.remove(key);
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<T> {
        self.ensure_open()?;

        self.documents.get(key).cloned().ok_or_else(|| {
            StoreError::new(&format!("document '{}' not found", key), ErrorKind::NotFound)
        })
    }

    fn has(&self, key: &str) -> StoreResult<bool> {
        self.ensure_open()?;
        Ok(self.documents.contains_key(key))
    }

    fn put(&mut self, key: &str, value: T) -> StoreResult<()> {
        self.ensure_open()?;
        validate_key(key)?;

        if let Some(backend) = self.backend.as_mut() {
            backend.put(key, value.clone())?;
        }
        self.documents.insert(key.to_string(), value);
        Ok(())
    }

    fn iter(&self) -> DocumentIterator<T> {
        if !self.open {
            return DocumentIterator::new(MemoryIterator::released());
        }
        DocumentIterator::new(MemoryIterator::new(Snapshot::from_map(
            self.documents.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Debug, PartialEq)]
    struct Student {
        age: u32,
    }

    fn students() -> MemoryCollection<Student> {
        let mut collection = MemoryCollection::new();
        collection.open().unwrap();
        collection.put("annie", Student { age: 32 }).unwrap();
        collection.put("ben", Student { age: 50 }).unwrap();
        collection.put("clive", Student { age: 21 }).unwrap();
        collection
    }

    /// Backend that records writes and can be told to fail them or its reads.
    #[derive(Clone, Default)]
    struct RecordingBackend {
        state: Rc<RefCell<BackendState>>,
    }

    #[derive(Default)]
    struct BackendState {
        documents: HashMap<String, Student>,
        fail_writes: bool,
        fail_reads: bool,
        opened: usize,
        closed: usize,
    }

    impl Collection<Student> for RecordingBackend {
        fn open(&mut self) -> StoreResult<()> {
            self.state.borrow_mut().opened += 1;
            Ok(())
        }

        fn close(&mut self) -> StoreResult<()> {
            self.state.borrow_mut().closed += 1;
            Ok(())
        }

        fn delete(&mut self, key: &str) -> StoreResult<()> {
            let mut state = self.state.borrow_mut();
            if state.fail_writes {
                return Err(StoreError::new("disk full", ErrorKind::BackendError));
            }
            state.documents.remove(key);
            Ok(())
        }

        fn get(&self, key: &str) -> StoreResult<Student> {
            self.state
                .borrow()
                .documents
                .get(key)
                .cloned()
                .ok_or_else(|| StoreError::new("missing", ErrorKind::NotFound))
        }

        fn has(&self, key: &str) -> StoreResult<bool> {
            Ok(self.state.borrow().documents.contains_key(key))
        }

        fn put(&mut self, key: &str, value: Student) -> StoreResult<()> {
            let mut state = self.state.borrow_mut();
            if state.fail_writes {
                return Err(StoreError::new("disk full", ErrorKind::BackendError));
            }
            state.documents.insert(key.to_string(), value);
            Ok(())
        }

        fn iter(&self) -> DocumentIterator<Student> {
            if self.state.borrow().fail_reads {
                return DocumentIterator::new(MemoryIterator::released());
            }
            let documents = self.state.borrow().documents.clone();
            DocumentIterator::new(MemoryIterator::new(Snapshot::from_map(documents)))
        }
    }

    #[test]
    fn test_put_then_get() {
        let collection = students();
        assert_eq!(collection.get("ben").unwrap(), Student { age: 50 });
        assert!(collection.has("annie").unwrap());
    }

    #[test]
    fn test_put_replaces_existing() {
        let mut collection = students();
        collection.put("ben", Student { age: 51 }).unwrap();
        assert_eq!(collection.get("ben").unwrap().age, 51);
        assert_eq!(collection.iter().count(), 3);
    }

    #[test]
    fn test_put_empty_key_is_rejected() {
        let mut collection = students();
        let err = collection.put("", Student { age: 1 }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidKey);
        assert!(!collection.has("").unwrap());
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let collection = students();
        let err = collection.get("dora").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
    }

    #[test]
    fn test_delete() {
        let mut collection = students();
        collection.delete("ben").unwrap();
        assert!(!collection.has("ben").unwrap());
        assert_eq!(collection.get("ben").unwrap_err().kind(), &ErrorKind::NotFound);

        // absent key
        collection.delete("ben").unwrap();
    }

    #[test]
    fn test_operations_before_open_fail_closed() {
        let mut collection: MemoryCollection<Student> = MemoryCollection::new();
        assert!(!collection.is_open());
        assert_eq!(collection.get("a").unwrap_err().kind(), &ErrorKind::Closed);
        assert_eq!(collection.has("a").unwrap_err().kind(), &ErrorKind::Closed);
        assert_eq!(collection.delete("a").unwrap_err().kind(), &ErrorKind::Closed);
        assert_eq!(
            collection.put("a", Student { age: 1 }).unwrap_err().kind(),
            &ErrorKind::Closed
        );
        assert!(collection.iter().is_released());
    }

    #[test]
    fn test_close_discards_documents() {
        let mut collection = students();
        collection.close().unwrap();
        assert_eq!(collection.get("ben").unwrap_err().kind(), &ErrorKind::Closed);

        collection.open().unwrap();
        assert!(!collection.has("ben").unwrap());
        assert_eq!(collection.iter().count(), 0);
    }

    #[test]
    fn test_iter_count_is_a_snapshot() {
        let mut collection = students();
        let it = collection.iter();

        collection.put("dora", Student { age: 9 }).unwrap();
        collection.delete("annie").unwrap();

        assert_eq!(it.count(), 3);
        assert!(it.get_all().unwrap().contains_key("annie"));
        assert_eq!(collection.iter().count(), 3);
    }

    #[test]
    fn test_iter_visits_every_document() {
        let collection = students();
        let it = collection.iter();
        let mut keys = Vec::new();
        while it.next() {
            keys.push(it.key().unwrap());
        }
        keys.sort();
        assert_eq!(keys, vec!["annie", "ben", "clive"]);
    }

    #[test]
    fn test_sort_keys_then_filter_scenario() {
        let collection = students();
        let it = collection
            .iter()
            .sort_keys(|a, b| a < b)
            .unwrap()
            .filter(|_, student| student.age >= 30)
            .unwrap();

        assert_eq!(it.get_all_keys().unwrap(), vec!["annie", "ben"]);
        it.release();
    }

    #[test]
    fn test_sort_keys_first_and_last() {
        let collection = students();
        let it = collection.iter().sort_keys(|a, b| a < b).unwrap();

        assert_eq!(it.count(), 3);
        assert!(it.first());
        assert_eq!(it.key(), Some("annie".to_string()));
        assert!(it.last());
        assert_eq!(it.key(), Some("clive".to_string()));
    }

    #[test]
    fn test_filter_leaves_source_usable() {
        let collection = students();
        let source = collection.iter();
        let young = source.filter(|_, s| s.age < 30).unwrap();

        assert_eq!(young.count(), 1);
        assert!(young.first());
        assert_eq!(young.get().unwrap().0, "clive");

        assert_eq!(source.count(), 3);
        assert!(source.first());
    }

    #[test]
    fn test_sort_is_stable_over_key_order() {
        let mut collection = MemoryCollection::new();
        collection.open().unwrap();
        for (key, age) in [("a", 2), ("b", 1), ("c", 2), ("d", 1), ("e", 2)] {
            collection.put(key, Student { age }).unwrap();
        }

        let it = collection
            .iter()
            .sort_keys(|a, b| a > b)
            .unwrap()
            .sort(|x, y| x.age < y.age)
            .unwrap();

        assert_eq!(it.get_all_keys().unwrap(), vec!["d", "b", "e", "c", "a"]);
    }

    #[test]
    fn test_release_pipeline_releases_root() {
        let collection = students();
        let root = collection.iter();
        let tail = root
            .filter(|_, s| s.age > 0)
            .unwrap()
            .sort(|a, b| a.age < b.age)
            .unwrap()
            .sort_keys(|a, b| a < b)
            .unwrap();

        tail.release();
        assert!(root.is_released());
        assert!(!root.next());
        assert_eq!(root.get_all_keys().unwrap_err().kind(), &ErrorKind::Released);
    }

    #[test]
    fn test_shared_handle_documents_alias() {
        let mut collection: MemoryCollection<Rc<RefCell<Student>>> = MemoryCollection::new();
        collection.open().unwrap();
        collection
            .put("ben", Rc::new(RefCell::new(Student { age: 50 })))
            .unwrap();

        let handle = collection.get("ben").unwrap();
        handle.borrow_mut().age = 51;

        assert_eq!(collection.get("ben").unwrap().borrow().age, 51);
    }

    #[test]
    fn test_plain_documents_are_copies() {
        let collection = students();
        let mut copy = collection.get("ben").unwrap();
        copy.age = 99;
        assert_eq!(collection.get("ben").unwrap().age, 50);
    }

    #[test]
    fn test_layered_open_reloads_backend() {
        let backend = RecordingBackend::default();
        backend
            .state
            .borrow_mut()
            .documents
            .insert("annie".to_string(), Student { age: 32 });

        let mut collection: MemoryCollection<Student> = MemoryCollection::layered(backend.clone());
        collection.open().unwrap();

        assert_eq!(backend.state.borrow().opened, 1);
        assert_eq!(collection.get("annie").unwrap().age, 32);
    }

    #[test]
    fn test_layered_writes_through() {
        let backend = RecordingBackend::default();
        let mut collection: MemoryCollection<Student> = MemoryCollection::layered(backend.clone());
        collection.open().unwrap();

        collection.put("ben", Student { age: 50 }).unwrap();
        assert!(backend.state.borrow().documents.contains_key("ben"));

        collection.delete("ben").unwrap();
        assert!(!backend.state.borrow().documents.contains_key("ben"));
    }

    #[test]
    fn test_layered_backend_failure_leaves_map_untouched() {
        let backend = RecordingBackend::default();
        let mut collection: MemoryCollection<Student> = MemoryCollection::layered(backend.clone());
        collection.open().unwrap();
        collection.put("ben", Student { age: 50 }).unwrap();

        backend.state.borrow_mut().fail_writes = true;

        let err = collection.put("ben", Student { age: 99 }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendError);
        assert_eq!(collection.get("ben").unwrap().age, 50);

        let err = collection.delete("ben").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::BackendError);
        assert!(collection.has("ben").unwrap());
    }

    #[test]
    fn test_layered_invalid_key_never_reaches_backend() {
        let backend = RecordingBackend::default();
        let mut collection: MemoryCollection<Student> = MemoryCollection::layered(backend.clone());
        collection.open().unwrap();

        let err = collection.put("", Student { age: 1 }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidKey);
        assert!(backend.state.borrow().documents.is_empty());
    }

    #[test]
    fn test_layered_close_closes_backend_and_keeps_its_data() {
        let backend = RecordingBackend::default();
        let mut collection: MemoryCollection<Student> = MemoryCollection::layered(backend.clone());
        collection.open().unwrap();
        collection.put("clive", Student { age: 21 }).unwrap();
        collection.close().unwrap();

        assert_eq!(backend.state.borrow().closed, 1);
        assert!(!collection.is_open());

        collection.open().unwrap();
        assert_eq!(collection.get("clive").unwrap().age, 21);
    }

    #[test]
    fn test_layered_reload_failure_passes_backend_error_through() {
        let backend = RecordingBackend::default();
        backend.state.borrow_mut().fail_reads = true;

        let mut collection: MemoryCollection<Student> = MemoryCollection::layered(backend.clone());
        let err = collection.open().unwrap_err();

        assert_eq!(err.kind(), &ErrorKind::Released);
        assert!(err.cause().is_none());
        assert!(!collection.is_open());
        assert_eq!(backend.state.borrow().opened, 1);
        assert_eq!(backend.state.borrow().closed, 1);
    }
}
