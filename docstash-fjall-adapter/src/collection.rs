use crate::config::FjallConfig;
use crate::iterator::FjallIterator;
use crate::wrapper::{decode_document, to_store_error};
use crate::FjallCollectionBuilder;
use docstash::collection::{validate_key, Collection};
use docstash::errors::{ErrorKind, StoreError, StoreResult};
use docstash::iter::DocumentIterator;
use docstash::marshal::DocumentMarshaler;
use fjall::{Keyspace, PartitionHandle, PersistMode};
use std::rc::Rc;

/// A persistent [`Collection`] stored in a fjall partition.
///
/// `FjallCollection` keeps each document under its key in one partition of a fjall
/// keyspace, encoded by a [`DocumentMarshaler`] into bytes. Iteration is key-ordered
/// and runs over a point-in-time snapshot of the partition.
///
/// # Examples
///
/// ```rust,no_run
/// use docstash::collection::Collection;
/// use docstash::marshal::JsonMarshaler;
/// use docstash_fjall_adapter::FjallCollection;
///
/// # fn main() -> Result<(), docstash::errors::StoreError> {
/// let mut ages = FjallCollection::with_config()
///     .production_preset()
///     .db_path("/path/to/db")
///     .partition_name("ages")
///     .build(JsonMarshaler::<u32>::new());
///
/// ages.open()?;
/// ages.put("ben", 50)?;
/// assert_eq!(ages.get("ben")?, 50);
/// ages.close()?;
/// # Ok(())
/// # }
/// ```
///
/// To keep documents in memory and use fjall only as durable storage, wrap it in a
/// [`MemoryCollection`](docstash::memory::MemoryCollection) with
/// `MemoryCollection::layered`.
pub struct FjallCollection<T> {
    config: FjallConfig,
    marshaler: Rc<dyn DocumentMarshaler<T, Vec<u8>>>,
    keyspace: Option<Keyspace>,
    partition: Option<PartitionHandle>,
}

impl FjallCollection<()> {
    /// Creates a new builder for configuring a fjall collection.
    #[inline]
    pub fn with_config() -> FjallCollectionBuilder {
        FjallCollectionBuilder::new()
    }
}

impl<T: Clone + 'static> FjallCollection<T> {
    /// Creates a closed collection. Nothing touches the disk until [`open`](Collection::open).
    pub fn new<M: DocumentMarshaler<T, Vec<u8>> + 'static>(config: FjallConfig, marshaler: M) -> Self {
        FjallCollection {
            config,
            marshaler: Rc::new(marshaler),
            keyspace: None,
            partition: None,
        }
    }

    pub fn config(&self) -> &FjallConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.partition.is_some()
    }

    /// Persists the journal to disk.
    pub fn commit(&self) -> StoreResult<()> {
        let Some(keyspace) = self.keyspace.as_ref() else {
            return Err(StoreError::closed());
        };

        match keyspace.persist(PersistMode::SyncAll) {
            Ok(_) => Ok(()),
            Err(err) => {
                log::error!("Failed to commit keyspace: {}", err);
                Err(to_store_error(err))
            }
        }
    }

    /// Closes the collection and deletes its data directory.
    pub fn destroy(&mut self) -> StoreResult<()> {
        self.close()?;

        let path = self.config.db_path();
        match std::fs::remove_dir_all(&path) {
            Ok(_) => {
                log::debug!("destroyed fjall collection at {}", path);
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                log::error!("Failed to remove fjall data directory {}: {}", path, err);
                Err(StoreError::from(err))
            }
        }
    }

    fn partition(&self) -> StoreResult<&PartitionHandle> {
        self.partition.as_ref().ok_or_else(StoreError::closed)
    }

    fn after_write(&self) -> StoreResult<()> {
        if self.config.sync_writes() {
            self.commit()?;
        }
        Ok(())
    }
}

impl<T: Clone + 'static> Collection<T> for FjallCollection<T> {
    fn open(&mut self) -> StoreResult<()> {
        if self.is_open() {
            return Ok(());
        }

        let path = self.config.db_path();
        if path.is_empty() {
            log::error!("Cannot open fjall collection without a database path");
            return Err(StoreError::new(
                "fjall database path is not configured",
                ErrorKind::InvalidOperation,
            ));
        }

        let keyspace = match Keyspace::open(self.config.keyspace_config()) {
            Ok(keyspace) => keyspace,
            Err(err) => {
                log::error!("Failed to open or create keyspace: {}", err);
                return Err(to_store_error(err));
            }
        };

        let name = self.config.partition_name();
        let partition = match keyspace.open_partition(&name, self.config.partition_config()) {
            Ok(partition) => partition,
            Err(err) => {
                log::error!("Failed to open partition {}: {}", name, err);
                return Err(to_store_error(err));
            }
        };

        self.keyspace = Some(keyspace);
        self.partition = Some(partition);
        log::debug!("fjall collection opened at {} (partition {})", path, name);
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        if !self.is_open() {
            return Ok(());
        }

        let result = if self.config.commit_before_close() {
            self.commit()
        } else {
            Ok(())
        };

        self.partition = None;
        self.keyspace = None;
        log::debug!("fjall collection closed");
        result
    }

    fn delete(&mut self, key: &str) -> StoreResult<()> {
        let partition = self.partition()?;
        if let Err(err) = partition.remove(key.as_bytes()) {
            log::error!("Failed to delete document from fjall: {}", err);
            return Err(to_store_error(err));
        }
        self.after_write()
    }

    fn get(&self, key: &str) -> StoreResult<T> {
        let partition = self.partition()?;
        match partition.get(key) {
            Ok(Some(value)) => decode_document(self.marshaler.as_ref(), key, &value),
            Ok(None) => Err(StoreError::new(
                &format!("document '{}' not found", key),
                ErrorKind::NotFound,
            )),
            Err(err) => {
                log::error!("Failed to get document from fjall: {}", err);
                Err(to_store_error(err))
            }
        }
    }

    fn has(&self, key: &str) -> StoreResult<bool> {
        let partition = self.partition()?;
        match partition.contains_key(key) {
            Ok(value) => Ok(value),
            Err(err) => {
                log::error!("Failed to check key in fjall: {}", err);
                Err(to_store_error(err))
            }
        }
    }

    fn put(&mut self, key: &str, value: T) -> StoreResult<()> {
        let partition = self.partition()?;
        validate_key(key)?;

        let bytes = self.marshaler.marshal(&value)?;
        if let Err(err) = partition.insert(key.as_bytes(), bytes) {
            log::error!("Failed to put document in fjall: {}", err);
            return Err(to_store_error(err));
        }
        self.after_write()
    }

    fn iter(&self) -> DocumentIterator<T> {
        match self.partition.as_ref() {
            Some(partition) => {
                DocumentIterator::new(FjallIterator::new(partition.snapshot(), self.marshaler.clone()))
            }
            None => DocumentIterator::new(FjallIterator::released(self.marshaler.clone())),
        }
    }
}

impl<T> Drop for FjallCollection<T> {
    fn drop(&mut self) {
        if let Some(keyspace) = self.keyspace.as_ref() {
            if self.config.commit_before_close() {
                if let Err(err) = keyspace.persist(PersistMode::SyncAll) {
                    log::error!("Failed to persist keyspace on drop: {}", err);
                }
            }
        }
    }
}
