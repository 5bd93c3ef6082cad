use fjall::{CompressionType, Config, KvSeparationOptions, PartitionCreateOptions};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Clone)]
/// Fjall collection configuration wrapper.
///
/// A cloneable configuration holder for the fjall keyspace and partition backing a
/// [`FjallCollection`](crate::FjallCollection). Uses PIMPL pattern with
/// `Rc<FjallConfigInner>`, so clones are cheap and observe the same settings.
///
/// Characteristics:
/// - Cloneable (Rc-based, cheap clones)
/// - Interior mutability through `Cell`, no locks (collections are single-threaded)
/// - Translates into `fjall::Config` and `PartitionCreateOptions` on open
///
/// Usage: create through [`FjallCollection::with_config`](crate::FjallCollection::with_config)
/// and the builder setters, or `FjallConfig::new()` in tests. Settings are read when
/// the collection opens; changing them afterwards affects the next open.
pub struct FjallConfig {
    inner: Rc<FjallConfigInner>,
}

impl FjallConfig {
    /// Creates a new configuration with default values.
    ///
    /// - Block cache: 64 MB, blob cache: 32 MB
    /// - Write buffer: 128 MB, max journaling size: 512 MB
    /// - Bloom filter: 10 bits per key
    /// - Compression: LZ4
    /// - Flush workers: available CPU cores, compaction workers: half of them
    /// - Partition: `documents`
    /// - Journal persisted on close, not after every write
    #[inline]
    pub fn new() -> FjallConfig {
        FjallConfig {
            inner: Rc::new(FjallConfigInner::new()),
        }
    }

    /// Builds a fjall keyspace configuration from this config.
    #[inline]
    pub(crate) fn keyspace_config(&self) -> Config {
        let mut config = Config::new(self.db_path());
        config = config
            .manual_journal_persist(self.manual_journal_persist())
            .flush_workers(self.flush_workers())
            .compaction_workers(self.compaction_workers())
            .cache_size(self.block_cache_capacity() + self.blob_cache_capacity())
            .max_journaling_size(self.max_journaling_size())
            .max_write_buffer_size(self.max_write_buffer_size());

        if self.fsync_frequency() > 0 {
            config = config.fsync_ms(Some(self.fsync_frequency()));
        }
        config
    }

    /// Builds the options for the partition holding the documents.
    #[inline]
    pub(crate) fn partition_config(&self) -> PartitionCreateOptions {
        let mut config = PartitionCreateOptions::default();
        config = config
            .bloom_filter_bits(if self.bloom_filter_bits() < 0 {
                None
            } else {
                Some(self.bloom_filter_bits() as u8)
            })
            .compression(self.compression_type())
            .max_memtable_size(self.max_memtable_size())
            .block_size(self.block_size());

        if self.kv_separated() {
            config = config.with_kv_separation(KvSeparationOptions::default());
        }
        config
    }

    #[inline]
    pub fn db_path(&self) -> String {
        self.inner.db_path.borrow().clone()
    }

    #[inline]
    pub(crate) fn set_db_path(&self, db_path: &str) {
        *self.inner.db_path.borrow_mut() = db_path.to_string();
    }

    #[inline]
    pub fn partition_name(&self) -> String {
        self.inner.partition_name.borrow().clone()
    }

    #[inline]
    pub(crate) fn set_partition_name(&self, name: &str) {
        *self.inner.partition_name.borrow_mut() = name.to_string();
    }

    #[inline]
    pub fn manual_journal_persist(&self) -> bool {
        self.inner.manual_journal_persist.get()
    }

    #[inline]
    pub(crate) fn set_manual_journal_persist(&self, v: bool) {
        self.inner.manual_journal_persist.set(v)
    }

    #[inline]
    pub fn flush_workers(&self) -> usize {
        self.inner.flush_workers.get()
    }

    #[inline]
    pub(crate) fn set_flush_workers(&self, c: usize) {
        self.inner.flush_workers.set(c)
    }

    #[inline]
    pub fn compaction_workers(&self) -> usize {
        self.inner.compaction_workers.get()
    }

    #[inline]
    pub(crate) fn set_compaction_workers(&self, c: usize) {
        self.inner.compaction_workers.set(c)
    }

    #[inline]
    pub fn block_cache_capacity(&self) -> u64 {
        self.inner.block_cache_capacity.get()
    }

    #[inline]
    pub(crate) fn set_block_cache_capacity(&self, c: u64) {
        self.inner.block_cache_capacity.set(c)
    }

    #[inline]
    pub fn blob_cache_capacity(&self) -> u64 {
        self.inner.blob_cache_capacity.get()
    }

    #[inline]
    pub(crate) fn set_blob_cache_capacity(&self, c: u64) {
        self.inner.blob_cache_capacity.set(c)
    }

    #[inline]
    pub fn max_journaling_size(&self) -> u64 {
        self.inner.max_journaling_size.get()
    }

    #[inline]
    pub(crate) fn set_max_journaling_size(&self, s: u64) {
        self.inner.max_journaling_size.set(s)
    }

    #[inline]
    pub fn max_write_buffer_size(&self) -> u64 {
        self.inner.max_write_buffer_size.get()
    }

    #[inline]
    pub(crate) fn set_max_write_buffer_size(&self, s: u64) {
        self.inner.max_write_buffer_size.set(s)
    }

    /// Journal fsync interval in milliseconds; 0 leaves fsync to fjall.
    #[inline]
    pub fn fsync_frequency(&self) -> u16 {
        self.inner.fsync_frequency.get()
    }

    #[inline]
    pub(crate) fn set_fsync_frequency(&self, f: u16) {
        self.inner.fsync_frequency.set(f)
    }

    /// Whether every put and delete persists the journal before returning.
    #[inline]
    pub fn sync_writes(&self) -> bool {
        self.inner.sync_writes.get()
    }

    #[inline]
    pub(crate) fn set_sync_writes(&self, v: bool) {
        self.inner.sync_writes.set(v)
    }

    /// Whether `close` persists the journal before dropping the keyspace.
    #[inline]
    pub fn commit_before_close(&self) -> bool {
        self.inner.commit_before_close.get()
    }

    #[inline]
    pub(crate) fn set_commit_before_close(&self, v: bool) {
        self.inner.commit_before_close.set(v)
    }

    /// Bloom filter bits per key; a negative value disables the filter.
    #[inline]
    pub fn bloom_filter_bits(&self) -> i8 {
        self.inner.bloom_filter_bits.get()
    }

    #[inline]
    pub(crate) fn set_bloom_filter_bits(&self, b: i8) {
        self.inner.bloom_filter_bits.set(b)
    }

    #[inline]
    pub fn compression_type(&self) -> CompressionType {
        self.inner.compression_type.borrow().clone()
    }

    #[inline]
    pub(crate) fn set_compression_type(&self, ct: CompressionType) {
        *self.inner.compression_type.borrow_mut() = ct;
    }

    #[inline]
    pub fn max_memtable_size(&self) -> u32 {
        self.inner.max_memtable_size.get()
    }

    #[inline]
    pub(crate) fn set_max_memtable_size(&self, s: u32) {
        self.inner.max_memtable_size.set(s)
    }

    #[inline]
    pub fn block_size(&self) -> u32 {
        self.inner.block_size.get()
    }

    #[inline]
    pub(crate) fn set_block_size(&self, s: u32) {
        self.inner.block_size.set(s)
    }

    #[inline]
    pub fn kv_separated(&self) -> bool {
        self.inner.kv_separated.get()
    }

    #[inline]
    pub(crate) fn set_kv_separated(&self, v: bool) {
        self.inner.kv_separated.set(v)
    }
}

impl Default for FjallConfig {
    fn default() -> Self {
        FjallConfig::new()
    }
}

/// Internal storage for the fjall settings of one collection.
struct FjallConfigInner {
    db_path: RefCell<String>,
    partition_name: RefCell<String>,
    manual_journal_persist: Cell<bool>,
    flush_workers: Cell<usize>,
    compaction_workers: Cell<usize>,
    block_cache_capacity: Cell<u64>,
    blob_cache_capacity: Cell<u64>,
    max_journaling_size: Cell<u64>,
    max_write_buffer_size: Cell<u64>,
    fsync_frequency: Cell<u16>,
    sync_writes: Cell<bool>,
    commit_before_close: Cell<bool>,

    bloom_filter_bits: Cell<i8>,
    compression_type: RefCell<CompressionType>,
    max_memtable_size: Cell<u32>,
    block_size: Cell<u32>,
    kv_separated: Cell<bool>,
}

impl FjallConfigInner {
    pub const DEFAULT_PARTITION: &'static str = "documents";

    /// Default block cache size: 64 MB. Fjall recommends 20-25% of available memory.
    pub const DEFAULT_BLOCK_CACHE_MB: u64 = 64;

    /// Default blob cache size: 32 MB for large value storage
    pub const DEFAULT_BLOB_CACHE_MB: u64 = 32;

    pub const DEFAULT_WRITE_BUFFER_MB: u64 = 128;

    pub const DEFAULT_MAX_JOURNALING_MB: u64 = 512;

    pub const DEFAULT_MEMTABLE_MB: u32 = 32;

    fn new() -> FjallConfigInner {
        let cpus = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(4);

        FjallConfigInner {
            db_path: RefCell::new(String::new()),
            partition_name: RefCell::new(Self::DEFAULT_PARTITION.to_string()),
            manual_journal_persist: Cell::new(false),
            flush_workers: Cell::new(cpus.max(1)),
            compaction_workers: Cell::new((cpus / 2).max(1)),
            block_cache_capacity: Cell::new(Self::DEFAULT_BLOCK_CACHE_MB * 1_024 * 1_024),
            blob_cache_capacity: Cell::new(Self::DEFAULT_BLOB_CACHE_MB * 1_024 * 1_024),
            max_journaling_size: Cell::new(Self::DEFAULT_MAX_JOURNALING_MB * 1_024 * 1_024),
            max_write_buffer_size: Cell::new(Self::DEFAULT_WRITE_BUFFER_MB * 1_024 * 1_024),
            fsync_frequency: Cell::new(0),
            sync_writes: Cell::new(false),
            commit_before_close: Cell::new(true),
            bloom_filter_bits: Cell::new(10),
            compression_type: RefCell::new(CompressionType::Lz4),
            max_memtable_size: Cell::new(Self::DEFAULT_MEMTABLE_MB * 1_024 * 1_024),
            block_size: Cell::new(4 * 1_024),
            kv_separated: Cell::new(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fjall_config_new() {
        let config = FjallConfig::new();
        let cpus = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(4);

        assert_eq!(config.db_path(), "");
        assert_eq!(config.partition_name(), "documents");
        assert!(!config.manual_journal_persist());
        assert_eq!(config.flush_workers(), cpus.max(1));
        assert_eq!(config.compaction_workers(), (cpus / 2).max(1));
        assert_eq!(config.block_cache_capacity(), 64 * 1_024 * 1_024);
        assert_eq!(config.blob_cache_capacity(), 32 * 1_024 * 1_024);
        assert_eq!(config.max_journaling_size(), 512 * 1_024 * 1_024);
        assert_eq!(config.max_write_buffer_size(), 128 * 1_024 * 1_024);
        assert_eq!(config.fsync_frequency(), 0);
        assert!(!config.sync_writes());
        assert!(config.commit_before_close());
        assert_eq!(config.bloom_filter_bits(), 10);
        assert_eq!(config.compression_type(), CompressionType::Lz4);
        assert_eq!(config.max_memtable_size(), 32 * 1_024 * 1_024);
        assert_eq!(config.block_size(), 4 * 1_024);
        assert!(!config.kv_separated());
    }

    #[test]
    fn test_setters_and_getters() {
        let config = FjallConfig::new();
        config.set_db_path("test_path");
        assert_eq!(config.db_path(), "test_path");

        config.set_partition_name("students");
        assert_eq!(config.partition_name(), "students");

        config.set_manual_journal_persist(true);
        assert!(config.manual_journal_persist());

        config.set_flush_workers(8);
        assert_eq!(config.flush_workers(), 8);

        config.set_compaction_workers(3);
        assert_eq!(config.compaction_workers(), 3);

        config.set_block_cache_capacity(32 * 1_024 * 1_024);
        assert_eq!(config.block_cache_capacity(), 32 * 1_024 * 1_024);

        config.set_blob_cache_capacity(16 * 1_024 * 1_024);
        assert_eq!(config.blob_cache_capacity(), 16 * 1_024 * 1_024);

        config.set_max_journaling_size(1_024 * 1_024);
        assert_eq!(config.max_journaling_size(), 1_024 * 1_024);

        config.set_max_write_buffer_size(8 * 1_024 * 1_024);
        assert_eq!(config.max_write_buffer_size(), 8 * 1_024 * 1_024);

        config.set_fsync_frequency(100);
        assert_eq!(config.fsync_frequency(), 100);

        config.set_sync_writes(true);
        assert!(config.sync_writes());

        config.set_commit_before_close(false);
        assert!(!config.commit_before_close());

        config.set_bloom_filter_bits(-1);
        assert_eq!(config.bloom_filter_bits(), -1);

        config.set_compression_type(CompressionType::None);
        assert_eq!(config.compression_type(), CompressionType::None);

        config.set_max_memtable_size(1_024 * 1_024);
        assert_eq!(config.max_memtable_size(), 1_024 * 1_024);

        config.set_block_size(8 * 1_024);
        assert_eq!(config.block_size(), 8 * 1_024);

        config.set_kv_separated(true);
        assert!(config.kv_separated());
    }

    #[test]
    fn test_clones_share_settings() {
        let config = FjallConfig::new();
        let other = config.clone();
        other.set_sync_writes(true);
        other.set_db_path("shared");

        assert!(config.sync_writes());
        assert_eq!(config.db_path(), "shared");
    }

    #[test]
    fn test_fjall_configs_build() {
        let config = FjallConfig::new();
        config.set_db_path("unused");
        config.set_fsync_frequency(50);
        config.set_kv_separated(true);
        config.set_bloom_filter_bits(-1);

        // translating never touches the disk
        let _keyspace = config.keyspace_config();
        let _partition = config.partition_config();
    }
}
