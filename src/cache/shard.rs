//! Shard Router Module
//!
//! Splits one logical cache into independently locked shards selected by key
//! hash. Besides cutting lock contention, this bounds the eviction scan to a
//! single shard's entries.

use std::borrow::Borrow;
use std::fmt;
use std::future::Future;
use std::hash::Hash;

use ahash::RandomState;
use tracing::warn;

use crate::cache::loader;
use crate::cache::{Cache, CacheStats, Ttl};
use crate::config::CacheConfig;

// == Sharded Cache ==
/// A logical cache partitioned across `N` [`Cache`] shards.
///
/// A key always routes to `shards[hash(key) % N]`; `N` and the hasher are
/// fixed for the router's lifetime. The capacity bound is split across shards
/// so the shard capacities sum to `max_entries`.
pub struct ShardedCache<K, V> {
    shards: Vec<Cache<K, V>>,
    hasher: RandomState,
}

impl<K, V> ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a router with `config.shard_count` shards.
    ///
    /// Zero shards is treated as one. When bounded, the shard count is
    /// clamped to `max_entries` so that every shard can hold an entry.
    pub fn new(config: &CacheConfig) -> Self {
        let mut shard_count = config.shard_count;
        if shard_count == 0 {
            warn!("shard_count of 0 requested, using a single shard");
            shard_count = 1;
        }
        if config.is_bounded() && shard_count > config.max_entries {
            warn!(
                "shard_count {} exceeds max_entries {}, clamping",
                shard_count, config.max_entries
            );
            shard_count = config.max_entries;
        }

        let base = config.max_entries / shard_count;
        let remainder = config.max_entries % shard_count;

        let shards = (0..shard_count)
            .map(|index| {
                let max_entries = base + usize::from(index < remainder);
                Cache::new(&CacheConfig {
                    max_entries,
                    shard_count: 1,
                    ..config.clone()
                })
            })
            .collect();

        Self {
            shards,
            hasher: RandomState::new(),
        }
    }

    pub(crate) fn shard_for<Q>(&self, key: &Q) -> &Cache<K, V>
    where
        Q: Hash + ?Sized,
    {
        let index = self.hasher.hash_one(key) % self.shards.len() as u64;
        &self.shards[index as usize]
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    // == Routed Operations ==
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).get(key)
    }

    pub fn set(&self, key: K, value: V, ttl: Ttl) {
        self.shard_for(&key).set(key, value, ttl)
    }

    pub fn insert(&self, key: K, value: V) {
        self.set(key, value, Ttl::Default)
    }

    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shard_for(key).delete(key)
    }

    // == Aggregate Operations ==
    pub fn clear(&self) {
        self.shards.iter().for_each(Cache::clear);
    }

    pub fn len(&self) -> usize {
        self.shards.iter().map(Cache::len).sum()
    }

    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Cache::is_empty)
    }

    /// Sum of every shard's counters and sizes.
    pub fn stats(&self) -> CacheStats {
        self.shards.iter().map(Cache::stats).sum()
    }

    /// Per-shard snapshots, in shard order.
    pub fn shard_stats(&self) -> Vec<CacheStats> {
        self.shards.iter().map(Cache::stats).collect()
    }

    pub fn sweep_expired(&self) -> usize {
        self.shards.iter().map(Cache::sweep_expired).sum()
    }

    // == Load Through ==
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        loader::get_or_fetch(self, key, Ttl::Default, fetch).await
    }

    pub async fn get_or_fetch_with_ttl<F, Fut, E>(&self, key: K, ttl: Ttl, fetch: F) -> Result<V, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        loader::get_or_fetch(self, key, ttl, fetch).await
    }

    // == Close ==
    /// Closes every shard, returning once all cleanup tasks have stopped.
    pub async fn close(&self) {
        for shard in &self.shards {
            shard.close().await;
        }
    }
}

impl<K, V> fmt::Debug for ShardedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedCache")
            .field("shards", &self.shards)
            .finish()
    }
}
