//! Engine Module
//!
//! The in-memory storage engine.
//!
//! ## Responsibilities
//! - Map opaque byte keys to opaque byte values
//! - Handle concurrent read/write access without a global lock
//! - Enforce the optional entry and byte limits

mod shard;

use std::collections::hash_map::Entry;

use crossbeam::utils::CachePadded;
use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::error::{KvError, Result};

use shard::Shard;

/// The main storage engine
///
/// ## Concurrency Model: Sharded Reader/Writer Locks
///
/// - Keys are spread over `shard_count` partitions by a CRC32 of the key bytes
/// - Each shard owns a `HashMap` behind its own `RwLock`
///   - **Reads** (get): shared lock on one shard, many concurrent readers
///   - **Writes** (put/delete): exclusive lock on one shard only
/// - Operations on keys in different shards never wait on each other
///
/// Every operation touches exactly one shard and completes under that
/// shard's lock, so operations on the same key are linearizable.
///
/// Entry and byte counters live together behind one small mutex, taken
/// while the shard lock is held. A write is checked and charged in a single
/// step, so a rejected Put never shows up in the counters.
pub struct Engine {
    /// Independently locked partitions, padded to avoid false sharing
    shards: Box<[CachePadded<Shard>]>,

    /// Entries and bytes across all shards
    usage: Mutex<Usage>,

    max_entries: Option<usize>,
    max_bytes: Option<usize>,
}

impl Engine {
    /// Create an empty engine
    pub fn new(config: EngineConfig) -> Self {
        let shard_count = config.shard_count.max(1);
        let shards = (0..shard_count)
            .map(|_| CachePadded::new(Shard::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        tracing::debug!(
            shard_count,
            max_entries = ?config.max_entries,
            max_bytes = ?config.max_bytes,
            "Engine created"
        );

        Self {
            shards,
            usage: Mutex::new(Usage::default()),
            max_entries: config.max_entries,
            max_bytes: config.max_bytes,
        }
    }

    /// Get a value by key
    ///
    /// Returns `None` if the key is absent. Never mutates the store.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.shard_for(key).read().get(key).cloned()
    }

    /// Put a key-value pair, overwriting any existing value
    ///
    /// Fails with `ResourceExhausted` if the write would exceed a configured
    /// limit; the store is left unchanged in that case.
    pub fn put(&self, key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Result<()> {
        let key = key.into();
        let value = value.into();
        let key_len = key.len();
        let new_size = key_len + value.len();

        let mut map = self.shard_for(&key).write();

        match map.entry(key) {
            Entry::Occupied(mut slot) => {
                let old_size = key_len + slot.get().len();
                self.charge(0, old_size, new_size)?;
                slot.insert(value);
            }
            Entry::Vacant(slot) => {
                self.charge(1, 0, new_size)?;
                slot.insert(value);
            }
        }

        Ok(())
    }

    /// Delete a key
    ///
    /// Returns `true` if the key was present and has been removed, `false`
    /// if it was absent (the store is unchanged).
    pub fn delete(&self, key: &[u8]) -> bool {
        let mut map = self.shard_for(key).write();

        match map.remove(key) {
            Some(value) => {
                let mut usage = self.usage.lock();
                usage.entries -= 1;
                usage.bytes -= key.len() + value.len();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Resource Accounting
    // =========================================================================

    /// Check and apply one write's effect on the counters
    ///
    /// Called with the key's shard locked. Leaves the counters untouched on
    /// error.
    fn charge(&self, new_entries: usize, old_size: usize, new_size: usize) -> Result<()> {
        let mut usage = self.usage.lock();

        let entries = usage.entries + new_entries;
        if let Some(limit) = self.max_entries {
            if new_entries > 0 && entries > limit {
                return Err(KvError::ResourceExhausted(format!(
                    "entry limit reached ({} of {})",
                    usage.entries, limit
                )));
            }
        }

        let bytes = (usage.bytes - old_size).saturating_add(new_size);
        if let Some(limit) = self.max_bytes {
            if new_size > old_size && bytes > limit {
                return Err(KvError::ResourceExhausted(format!(
                    "byte limit reached ({} + {} > {})",
                    usage.bytes,
                    new_size - old_size,
                    limit
                )));
            }
        }

        *usage = Usage { entries, bytes };
        Ok(())
    }

    fn shard_for(&self, key: &[u8]) -> &Shard {
        let index = crc32fast::hash(key) as usize % self.shards.len();
        &self.shards[index]
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the number of stored entries
    pub fn len(&self) -> usize {
        self.usage.lock().entries
    }

    /// Check whether the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the total bytes of stored keys and values
    pub fn size_bytes(&self) -> usize {
        self.usage.lock().bytes
    }

    /// Get the number of shards
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Get the entry count of each shard, in shard order
    pub fn shard_lens(&self) -> Vec<usize> {
        self.shards.iter().map(|shard| shard.len()).collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Usage {
    entries: usize,
    bytes: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
