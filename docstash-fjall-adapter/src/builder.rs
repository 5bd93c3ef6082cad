use crate::collection::FjallCollection;
use crate::config::FjallConfig;
use docstash::marshal::DocumentMarshaler;
use fjall::CompressionType;

/// Builder for configuring a fjall-backed collection.
///
/// `FjallCollectionBuilder` provides a fluent API for customizing fjall storage
/// parameters. It includes preset configurations for common use cases and individual
/// parameter setters.
///
/// # Configuration Presets
///
/// - `production_preset()` - Balanced configuration for production use
/// - `low_memory_preset()` - Optimized for low-memory environments
pub struct FjallCollectionBuilder {
    store_config: FjallConfig,
}

impl FjallCollectionBuilder {
    #[inline]
    pub fn new() -> FjallCollectionBuilder {
        FjallCollectionBuilder {
            store_config: FjallConfig::new(),
        }
    }

    /// Applies production-optimized preset configuration.
    ///
    /// This configures:
    /// - 256 MB block cache and 64 MB blob cache
    /// - 128 MB write buffer, 32 MB memtable
    /// - All CPU cores for flush workers, half for compaction workers
    /// - Bloom filter with 10 bits per key
    /// - 100ms fsync interval
    /// - LZ4 compression
    #[inline]
    pub fn production_preset(self) -> Self {
        let cpus = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(4);

        self.block_cache_capacity(256 * 1024 * 1024)
            .blob_cache_capacity(64 * 1024 * 1024)
            .max_write_buffer_size(128 * 1024 * 1024)
            .max_memtable_size(32 * 1024 * 1024)
            .flush_workers(cpus)
            .compaction_workers((cpus / 2).max(1))
            .bloom_filter_bits(10)
            .fsync_frequency(100) // 100ms
            .compression_type(CompressionType::Lz4)
    }

    /// Applies settings for memory-constrained environments such as tests, development
    /// machines or embedded devices, at the cost of some throughput.
    #[inline]
    pub fn low_memory_preset(self) -> Self {
        self.block_cache_capacity(16 * 1024 * 1024)
            .blob_cache_capacity(8 * 1024 * 1024)
            .max_write_buffer_size(32 * 1024 * 1024)
            .max_memtable_size(8 * 1024 * 1024)
            .flush_workers(1)
            .compaction_workers(1)
            .bloom_filter_bits(10)
    }

    #[inline]
    pub fn db_path(self, db_path: &str) -> Self {
        self.store_config.set_db_path(db_path);
        self
    }

    #[inline]
    pub fn partition_name(self, partition_name: &str) -> Self {
        self.store_config.set_partition_name(partition_name);
        self
    }

    #[inline]
    pub fn manual_journal_persist(self, manual_journal_persist: bool) -> Self {
        self.store_config
            .set_manual_journal_persist(manual_journal_persist);
        self
    }

    #[inline]
    pub fn flush_workers(self, flush_workers_count: usize) -> Self {
        self.store_config.set_flush_workers(flush_workers_count);
        self
    }

    #[inline]
    pub fn compaction_workers(self, compaction_workers_count: usize) -> Self {
        self.store_config
            .set_compaction_workers(compaction_workers_count);
        self
    }

    #[inline]
    pub fn block_cache_capacity(self, block_cache_capacity: u64) -> Self {
        self.store_config
            .set_block_cache_capacity(block_cache_capacity);
        self
    }

    #[inline]
    pub fn blob_cache_capacity(self, blob_cache_capacity: u64) -> Self {
        self.store_config.set_blob_cache_capacity(blob_cache_capacity);
        self
    }

    #[inline]
    pub fn max_journaling_size(self, max_journaling_size: u64) -> Self {
        self.store_config.set_max_journaling_size(max_journaling_size);
        self
    }

    #[inline]
    pub fn max_write_buffer_size(self, max_write_buffer_size: u64) -> Self {
        self.store_config
            .set_max_write_buffer_size(max_write_buffer_size);
        self
    }

    #[inline]
    pub fn fsync_frequency(self, fsync_frequency: u16) -> Self {
        self.store_config.set_fsync_frequency(fsync_frequency);
        self
    }

    #[inline]
    pub fn sync_writes(self, sync_writes: bool) -> Self {
        self.store_config.set_sync_writes(sync_writes);
        self
    }

    #[inline]
    pub fn commit_before_close(self, commit_before_close: bool) -> Self {
        self.store_config.set_commit_before_close(commit_before_close);
        self
    }

    #[inline]
    pub fn bloom_filter_bits(self, bloom_filter_bits: u8) -> Self {
        self.store_config
            .set_bloom_filter_bits(bloom_filter_bits.min(i8::MAX as u8) as i8);
        self
    }

    #[inline]
    pub fn disable_bloom_filter(self) -> Self {
        self.store_config.set_bloom_filter_bits(-1);
        self
    }

    #[inline]
    pub fn compression_type(self, compression_type: CompressionType) -> Self {
        self.store_config.set_compression_type(compression_type);
        self
    }

    #[inline]
    pub fn max_memtable_size(self, max_memtable_size: u32) -> Self {
        self.store_config.set_max_memtable_size(max_memtable_size);
        self
    }

    #[inline]
    pub fn block_size(self, block_size: u32) -> Self {
        self.store_config.set_block_size(block_size);
        self
    }

    #[inline]
    pub fn kv_separated(self, kv_separated: bool) -> Self {
        self.store_config.set_kv_separated(kv_separated);
        self
    }

    /// Builds a closed collection that encodes documents with `marshaler`.
    #[inline]
    pub fn build<T, M>(self, marshaler: M) -> FjallCollection<T>
    where
        T: Clone + 'static,
        M: DocumentMarshaler<T, Vec<u8>> + 'static,
    {
        FjallCollection::new(self.store_config, marshaler)
    }
}

impl Default for FjallCollectionBuilder {
    fn default() -> Self {
        FjallCollectionBuilder::new()
    }
}
