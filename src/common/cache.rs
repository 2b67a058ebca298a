//! In-memory cache for storing key-value pairs.
//!
//! Uses moka's concurrent cache implementation.

use moka::{policy::EvictionPolicy, sync::Cache};

/// Thread-safe in-memory cache with configurable capacity.
///
/// Evicts least recently used entries, so a freshly set entry is always kept.
///
/// Backs [`MemStore`](crate::store::MemStore), keyed by trace id.
#[derive(Clone)]
pub struct MemCache<K, V> {
    entries: Cache<K, V>,
}

impl<K, V> MemCache<K, V>
where
    K: std::hash::Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Allocate a new [`MemCache`].
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity as u64).eviction_policy(EvictionPolicy::lru()).build(),
        }
    }

    /// Insert or replace the entry for `key`.
    pub fn set(
        &self,
        key: K,
        value: V,
    ) {
        self.entries.insert(key, value);
    }

    /// Get a clone of the entry for `key`.
    pub fn get(
        &self,
        key: &K,
    ) -> Option<V> {
        self.entries.get(key)
    }
}
