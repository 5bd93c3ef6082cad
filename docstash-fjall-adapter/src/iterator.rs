use crate::wrapper::{decode_document, decode_key, to_store_error};
use docstash::errors::{ErrorKind, StoreError, StoreResult};
use docstash::iter::{DocumentIterator, DocumentIteratorProvider, Snapshot};
use docstash::marshal::DocumentMarshaler;
use fjall::Slice;
use std::cell::Cell;
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::Bound::{Excluded, Unbounded};
use std::rc::Rc;

enum Cursor {
    BeforeFirst,
    At { key: Slice, value: Slice },
    AfterLast,
}

/// Key-ordered cursor over a point-in-time snapshot of a fjall partition.
///
/// Navigation reads the snapshot directly with range lookups, so writes to the
/// collection after the iterator was created are never observed. The query
/// operators drain the whole snapshot into memory.
///
/// Releasing drops the fjall snapshot. That happens once; later releases are no-ops.
pub struct FjallIterator<T> {
    snapshot: Option<fjall::Snapshot>,
    // counting scans the whole snapshot, so it is done at most once
    len: Cell<Option<usize>>,
    cursor: Cursor,
    marshaler: Rc<dyn DocumentMarshaler<T, Vec<u8>>>,
}

impl<T> FjallIterator<T> {
    pub(crate) fn new(
        snapshot: fjall::Snapshot,
        marshaler: Rc<dyn DocumentMarshaler<T, Vec<u8>>>,
    ) -> Self {
        FjallIterator {
            snapshot: Some(snapshot),
            len: Cell::new(None),
            cursor: Cursor::BeforeFirst,
            marshaler,
        }
    }

    pub(crate) fn released(marshaler: Rc<dyn DocumentMarshaler<T, Vec<u8>>>) -> Self {
        FjallIterator {
            snapshot: None,
            len: Cell::new(None),
            cursor: Cursor::BeforeFirst,
            marshaler,
        }
    }

    // a failed read ends the walk in the direction it was heading
    fn settle<E: Display>(
        &mut self,
        read: Result<Option<(Slice, Slice)>, E>,
        missing: Cursor,
    ) -> bool {
        match read {
            Ok(Some((key, value))) => {
                self.cursor = Cursor::At { key, value };
                true
            }
            Ok(None) => {
                self.cursor = missing;
                false
            }
            Err(err) => {
                log::error!("Failed to move cursor over fjall snapshot: {}", err);
                self.cursor = missing;
                false
            }
        }
    }

    fn drain(&self) -> StoreResult<(Vec<String>, HashMap<String, T>)> {
        let snapshot = self.snapshot.as_ref().ok_or_else(StoreError::released)?;

        let mut keys = Vec::new();
        let mut documents = HashMap::new();
        for entry in snapshot.iter() {
            let (key, value) = entry.map_err(|err| {
                log::error!("Failed to read fjall snapshot: {}", err);
                to_store_error(err)
            })?;

            let key = decode_key(&key)?;
            let document = decode_document(self.marshaler.as_ref(), &key, &value)?;
            documents.insert(key.clone(), document);
            keys.push(key);
        }
        self.len.set(Some(keys.len()));
        Ok((keys, documents))
    }
}

impl<T: Clone> DocumentIteratorProvider<T> for FjallIterator<T> {
    fn first(&mut self) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };
        let read = snapshot.first_key_value();
        self.settle(read, Cursor::AfterLast)
    }

    fn last(&mut self) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };
        let read = snapshot.last_key_value();
        self.settle(read, Cursor::BeforeFirst)
    }

    fn next(&mut self) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };

        let read = match &self.cursor {
            Cursor::BeforeFirst => snapshot.first_key_value(),
            Cursor::At { key, .. } => snapshot
                .range((Excluded(key.clone()), Unbounded))
                .next()
                .transpose(),
            Cursor::AfterLast => return false,
        };
        self.settle(read, Cursor::AfterLast)
    }

    fn prev(&mut self) -> bool {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return false;
        };

        let read = match &self.cursor {
            Cursor::BeforeFirst => return false,
            Cursor::At { key, .. } => snapshot
                .range((Unbounded, Excluded(key.clone())))
                .next_back()
                .transpose(),
            Cursor::AfterLast => snapshot.last_key_value(),
        };
        self.settle(read, Cursor::BeforeFirst)
    }

    fn release(&mut self) -> Option<DocumentIterator<T>> {
        if self.snapshot.take().is_some() {
            log::debug!("released fjall snapshot");
        }
        self.len.set(None);
        self.cursor = Cursor::BeforeFirst;
        None
    }

    fn is_released(&self) -> bool {
        self.snapshot.is_none()
    }

    fn count(&self) -> usize {
        let Some(snapshot) = self.snapshot.as_ref() else {
            return 0;
        };
        if let Some(len) = self.len.get() {
            return len;
        }

        match snapshot.len() {
            Ok(len) => {
                self.len.set(Some(len));
                len
            }
            Err(err) => {
                log::warn!("Failed to count fjall snapshot: {}", err);
                0
            }
        }
    }

    fn key(&self) -> Option<String> {
        if self.snapshot.is_none() {
            return None;
        }
        match &self.cursor {
            Cursor::At { key, .. } => decode_key(key).ok(),
            _ => None,
        }
    }

    fn value(&self) -> StoreResult<T> {
        if self.snapshot.is_none() {
            return Err(StoreError::released());
        }

        match &self.cursor {
            Cursor::At { key, value } => {
                let key = decode_key(key)?;
                decode_document(self.marshaler.as_ref(), &key, value)
            }
            _ => Err(StoreError::new(
                "iterator is not positioned on a document",
                ErrorKind::NotFound,
            )),
        }
    }

    fn get_all(&self) -> StoreResult<HashMap<String, T>> {
        let (_, documents) = self.drain()?;
        Ok(documents)
    }

    fn get_all_keys(&self) -> StoreResult<Vec<String>> {
        let snapshot = self.snapshot.as_ref().ok_or_else(StoreError::released)?;

        let mut keys = Vec::new();
        for entry in snapshot.iter() {
            let (key, _) = entry.map_err(|err| {
                log::error!("Failed to read fjall snapshot keys: {}", err);
                to_store_error(err)
            })?;
            keys.push(decode_key(&key)?);
        }
        Ok(keys)
    }

    fn snapshot(&mut self) -> StoreResult<Snapshot<T>> {
        let (keys, documents) = self.drain()?;
        Ok(Snapshot::new(keys, Rc::new(documents)))
    }
}
