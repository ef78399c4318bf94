//! Fixed-shard concurrent cache.
//!
//! [`ShardedCache`] spreads entries over a fixed array of independently
//! locked partitions so that hot read paths (one cache lookup per request)
//! contend only with writers touching the same partition. The shard array is
//! allocated once at construction and never resized or rebalanced.
//!
//! Partition selection is defined by [`ShardKey`]. For integer keys it is the
//! identity value modulo the shard count: cheap, and uniform for the dense
//! sequential ids the user store hands out. Key sets that are congruent
//! modulo the shard count will pile onto one partition; callers with such
//! keys need a different shard count, not a different cache.
//!
//! The cache is a pure performance layer over the durable ledger. Absence of
//! a key means only "not cached", never "no such record", and every entry can
//! be rebuilt from the ledger. That is also why poisoned partition locks are
//! absorbed rather than propagated: a panicked writer must not take a whole
//! partition of reconstructible data down with it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

/// Maps a key to a partition index.
pub trait ShardKey {
    /// Partition index for this key, in `0..shards`.
    ///
    /// `shards` is the fixed partition count of the cache and is always
    /// non-zero.
    fn shard(&self, shards: usize) -> usize;
}

impl ShardKey for i64 {
    fn shard(&self, shards: usize) -> usize {
        self.rem_euclid(shards as i64) as usize
    }
}

impl ShardKey for u64 {
    fn shard(&self, shards: usize) -> usize {
        (self % shards as u64) as usize
    }
}

impl ShardKey for usize {
    fn shard(&self, shards: usize) -> usize {
        self % shards
    }
}

impl ShardKey for crate::user::UserId {
    fn shard(&self, shards: usize) -> usize {
        self.as_i64().shard(shards)
    }
}

/// A concurrent map partitioned into a fixed number of independently locked
/// shards.
///
/// Reads on one partition proceed in parallel; a write excludes only readers
/// and writers of its own partition. No operation ever touches more than one
/// partition, and no ordering is defined across partitions.
pub struct ShardedCache<K, V> {
    shards: Vec<RwLock<HashMap<K, V>>>,
}

impl<K: Eq + Hash + ShardKey, V: Clone> ShardedCache<K, V> {
    /// Partition count used when a caller asks for zero shards.
    pub const DEFAULT_SHARDS: usize = 256;

    /// Create a cache with a fixed number of partitions.
    ///
    /// A `shards` value of zero selects [`Self::DEFAULT_SHARDS`].
    pub fn new(shards: usize) -> Self {
        let count = if shards == 0 {
            Self::DEFAULT_SHARDS
        } else {
            shards
        };
        let mut partitions = Vec::with_capacity(count);
        for _ in 0..count {
            partitions.push(RwLock::new(HashMap::new()));
        }
        Self { shards: partitions }
    }

    /// Number of partitions, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// The partition index a key maps to.
    pub fn shard_of(&self, key: &K) -> usize {
        key.shard(self.shards.len())
    }

    fn shard(&self, key: &K) -> &RwLock<HashMap<K, V>> {
        &self.shards[self.shard_of(key)]
    }

    /// Look up a key, cloning the value out while the partition read lock is
    /// held.
    pub fn get(&self, key: &K) -> Option<V> {
        let shard = self.shard(key).read().unwrap_or_else(|e| e.into_inner());
        shard.get(key).cloned()
    }

    /// Whether a key is currently cached.
    pub fn has(&self, key: &K) -> bool {
        let shard = self.shard(key).read().unwrap_or_else(|e| e.into_inner());
        shard.contains_key(key)
    }

    /// Insert or replace a value.
    pub fn set(&self, key: K, value: V) {
        let mut shard = self.shard(&key).write().unwrap_or_else(|e| e.into_inner());
        shard.insert(key, value);
    }

    /// Remove a key, returning the evicted value if one was cached.
    pub fn delete(&self, key: &K) -> Option<V> {
        let mut shard = self.shard(key).write().unwrap_or_else(|e| e.into_inner());
        shard.remove(key)
    }
}

impl<K: Eq + Hash + ShardKey, V: Clone> Default for ShardedCache<K, V> {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SHARDS)
    }
}
