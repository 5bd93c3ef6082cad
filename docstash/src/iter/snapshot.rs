use crate::iter::sort::{sort_by_key, sort_by_value};
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::rc::Rc;

/// A fixed, ordered view of documents captured when an iterator is created.
///
/// The key list fixes the traversal order; the document map is shared between
/// iterators whose contents are identical (a sorted iterator and its source) and is
/// never mutated once captured.
pub struct Snapshot<T> {
    keys: Vec<String>,
    documents: Rc<HashMap<String, T>>,
}

impl<T> Snapshot<T> {
    /// Captures `documents`; the key order is whatever the map yields.
    pub fn from_map(documents: HashMap<String, T>) -> Self {
        let keys = documents.keys().cloned().collect();
        Snapshot {
            keys,
            documents: Rc::new(documents),
        }
    }

    /// Captures `documents` visited in `keys` order.
    pub fn new(keys: Vec<String>, documents: Rc<HashMap<String, T>>) -> Self {
        Snapshot { keys, documents }
    }

    pub fn empty() -> Self {
        Snapshot {
            keys: Vec::new(),
            documents: Rc::new(HashMap::new()),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn documents(&self) -> &Rc<HashMap<String, T>> {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Orders the snapshot by document with a stable sort; the documents are shared.
    pub fn sort_by_value<F>(&self, less: F) -> Snapshot<T>
    where
        F: Fn(&T, &T) -> bool,
    {
        let keys = sort_by_value(&self.keys, &self.documents, less);
        Snapshot::new(keys, Rc::clone(&self.documents))
    }

    /// Orders the snapshot by key with a stable sort; the documents are shared.
    pub fn sort_by_key<F>(&self, less: F) -> Snapshot<T>
    where
        F: Fn(&str, &str) -> bool,
    {
        let keys = sort_by_key(&self.keys, less);
        Snapshot::new(keys, Rc::clone(&self.documents))
    }
}

impl<T: Clone> Snapshot<T> {
    /// Keeps the entries accepted by `predicate`, in snapshot order, in a map of their own.
    pub fn filter<F>(&self, predicate: F) -> Snapshot<T>
    where
        F: Fn(&str, &T) -> bool,
    {
        let mut keys = Vec::new();
        let mut documents = HashMap::new();
        for key in &self.keys {
            if let Some(document) = self.documents.get(key) {
                if predicate(key, document) {
                    keys.push(key.clone());
                    documents.insert(key.clone(), document.clone());
                }
            }
        }
        Snapshot::new(keys, Rc::new(documents))
    }
}

impl<T> Debug for Snapshot<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("keys", &self.keys)
            .field("documents", &self.documents.len())
            .finish()
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Snapshot {
            keys: self.keys.clone(),
            documents: Rc::clone(&self.documents),
        }
    }
}
