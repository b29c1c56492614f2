//! Load-Through Module
//!
//! Cache-aside access: return the cached value, or call a caller-supplied
//! fetch function and populate the cache with its result.
//!
//! There is no request coalescing. Concurrent misses on the same key each
//! invoke their own fetch and the last write wins.

use std::future::Future;
use std::hash::Hash;

use crate::cache::{Cache, CacheStats, ShardedCache, Ttl};

// == Store Trait ==
/// The narrow cache interface the load-through path needs.
pub trait Store<K, V>: Send + Sync {
    /// Looks up a live value.
    fn get(&self, key: &K) -> Option<V>;

    /// Stores a value.
    fn set(&self, key: K, value: V, ttl: Ttl);

    /// Counts a miss that was resolved by a successful fetch.
    fn record_load(&self, key: &K);

    /// Snapshot of the counters.
    fn stats(&self) -> CacheStats;
}

impl<K, V> Store<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        Cache::get(self, key)
    }

    fn set(&self, key: K, value: V, ttl: Ttl) {
        Cache::set(self, key, value, ttl)
    }

    fn record_load(&self, _key: &K) {
        Cache::record_load(self)
    }

    fn stats(&self) -> CacheStats {
        Cache::stats(self)
    }
}

impl<K, V> Store<K, V> for ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        ShardedCache::get(self, key)
    }

    fn set(&self, key: K, value: V, ttl: Ttl) {
        ShardedCache::set(self, key, value, ttl)
    }

    fn record_load(&self, key: &K) {
        self.shard_for(key).record_load()
    }

    fn stats(&self) -> CacheStats {
        ShardedCache::stats(self)
    }
}

// == Get Or Fetch ==
/// Returns the cached value for `key`, or fetches and caches it.
///
/// - Hit: `fetch` is never called.
/// - Miss: `fetch(key)` is awaited with no cache lock held. A failure is
///   returned untouched and nothing is cached. A success is stored with
///   `ttl`, counted as a load, and returned.
pub async fn get_or_fetch<S, K, V, E, F, Fut>(store: &S, key: K, ttl: Ttl, fetch: F) -> Result<V, E>
where
    S: Store<K, V> + ?Sized,
    K: Clone,
    V: Clone,
    F: FnOnce(K) -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    if let Some(value) = store.get(&key) {
        return Ok(value);
    }

    let value = fetch(key.clone()).await?;

    store.record_load(&key);
    store.set(key, value.clone(), ttl);
    Ok(value)
}
