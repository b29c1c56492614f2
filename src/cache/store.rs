//! Cache Store Module
//!
//! Main cache engine: a reader/writer-locked map with TTL expiry, capacity
//! bounded approximate-LRU eviction and a background expiry sweep.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::cache::loader;
use crate::cache::stats::StatsCounters;
use crate::cache::{CacheEntry, CacheStats, Ttl};
use crate::config::CacheConfig;
use crate::tasks::{spawn_cleanup_task, CleanupHandle, Sweep};

/// Maximum number of keys removed per exclusive-lock acquisition during a sweep.
pub const SWEEP_BATCH: usize = 256;

// == Shared State ==
/// State shared between a cache handle and its cleanup task.
struct Shared<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    counters: StatsCounters,
    /// Logical clock for access stamps
    clock: AtomicU64,
    default_ttl: Duration,
    max_entries: usize,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
{
    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed) + 1
    }

    // == Evict One ==
    /// Frees one slot. An expired entry is dropped in preference to a live
    /// one and does not count as an eviction.
    fn evict_one(&self, entries: &mut HashMap<K, CacheEntry<V>>, now: Instant) {
        let mut expired: Option<&K> = None;
        let mut oldest: Option<(&K, u64)> = None;

        for (key, entry) in entries.iter() {
            if entry.is_expired_at(now) {
                expired = Some(key);
                break;
            }
            let stamp = entry.last_access();
            if oldest.map_or(true, |(_, oldest_stamp)| stamp < oldest_stamp) {
                oldest = Some((key, stamp));
            }
        }

        let (victim, live) = match (expired, oldest) {
            (Some(key), _) => (key.clone(), false),
            (None, Some((key, _))) => (key.clone(), true),
            (None, None) => return,
        };

        entries.remove(&victim);
        if live {
            self.counters.record_eviction();
            debug!("Evicted least recently used entry to stay within {} entries", self.max_entries);
        }
    }
}

impl<K, V> Sweep for Shared<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn sweep(&self) -> usize {
        let now = Instant::now();

        // Collect under the shared lock so readers are not blocked by the scan.
        let expired: Vec<K> = self
            .entries
            .read()
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let mut removed = 0;
        for batch in expired.chunks(SWEEP_BATCH) {
            let mut entries = self.entries.write();
            for key in batch {
                // The key may have been rewritten since the scan.
                if entries.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
                    entries.remove(key);
                    removed += 1;
                }
            }
        }

        removed
    }
}

// == Cache ==
/// Concurrent key-value cache with per-entry TTL and a capacity bound.
///
/// Lookups take a shared lock; writes, deletes, eviction and sweeps take the
/// exclusive lock. Counters are lock-free and advisory.
///
/// `close` must be the last call made on a cache; later calls are a caller
/// bug (they do not corrupt state, but entries written after close are never
/// swept).
pub struct Cache<K, V> {
    shared: Arc<Shared<K, V>>,
    cleanup: Mutex<Option<CleanupHandle>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a cache with the given policy.
    ///
    /// The cleanup task is started when `cleanup_interval` is non-zero and a
    /// tokio runtime is available; otherwise expiry is lazy only.
    pub fn new(config: &CacheConfig) -> Self {
        let shared = Arc::new(Shared {
            entries: RwLock::new(HashMap::new()),
            counters: StatsCounters::default(),
            clock: AtomicU64::new(0),
            default_ttl: config.default_ttl,
            max_entries: config.max_entries,
        });

        let cleanup = spawn_cleanup_task(Arc::downgrade(&shared), config.cleanup_interval);

        Self {
            shared,
            cleanup: Mutex::new(cleanup),
        }
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// A missing or expired key is a miss; an expired entry is removed on the
    /// way out. A hit refreshes the entry's access stamp.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();

        {
            let entries = self.shared.entries.read();
            match entries.get(key) {
                None => {
                    self.shared.counters.record_miss();
                    return None;
                }
                Some(entry) if !entry.is_expired_at(now) => {
                    entry.touch(self.shared.tick());
                    self.shared.counters.record_hit();
                    return Some(entry.value.clone());
                }
                Some(_) => {}
            }
        }

        // Expired: upgrade to the exclusive lock and re-check, since a
        // concurrent write may have replaced the entry.
        {
            let mut entries = self.shared.entries.write();
            if entries.get(key).is_some_and(|entry| entry.is_expired_at(now)) {
                entries.remove(key);
            }
        }

        self.shared.counters.record_miss();
        None
    }

    // == Set ==
    /// Stores a value under `key` with the requested TTL.
    ///
    /// Inserting a new key into a full cache first evicts the least recently
    /// used entry; overwriting an existing key never evicts.
    pub fn set(&self, key: K, value: V, ttl: Ttl) {
        let now = Instant::now();
        let entry = CacheEntry::new(
            value,
            ttl.expires_at(self.shared.default_ttl, now),
            self.shared.tick(),
        );

        let mut entries = self.shared.entries.write();
        if self.shared.max_entries > 0
            && entries.len() >= self.shared.max_entries
            && !entries.contains_key(&key)
        {
            self.shared.evict_one(&mut entries, now);
        }
        entries.insert(key, entry);
    }

    /// Stores a value with the cache's default TTL.
    pub fn insert(&self, key: K, value: V) {
        self.set(key, value, Ttl::Default);
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if an entry was removed.
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.shared.entries.write().remove(key).is_some()
    }

    // == Clear ==
    /// Removes every entry. Counters are kept.
    pub fn clear(&self) {
        self.shared.entries.write().clear();
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones that
    /// have not been swept yet.
    pub fn len(&self) -> usize {
        self.shared.entries.read().len()
    }

    /// Alias of [`Cache::len`].
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.read().is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub fn stats(&self) -> CacheStats {
        self.shared.counters.snapshot(self.len())
    }

    pub(crate) fn record_load(&self) {
        self.shared.counters.record_load();
    }

    // == Cleanup Expired ==
    /// Removes all expired entries now, returning how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.shared.sweep()
    }

    /// Returns true while the background cleanup task is attached.
    pub fn has_cleanup_task(&self) -> bool {
        self.cleanup.lock().is_some()
    }

    // == Load Through ==
    /// Returns the cached value, or fetches, stores and returns it.
    ///
    /// See [`loader::get_or_fetch`].
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        loader::get_or_fetch(self, key, Ttl::Default, fetch).await
    }

    /// Like [`Cache::get_or_fetch`], storing a fetched value with `ttl`.
    pub async fn get_or_fetch_with_ttl<F, Fut, E>(&self, key: K, ttl: Ttl, fetch: F) -> Result<V, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        loader::get_or_fetch(self, key, ttl, fetch).await
    }

    // == Close ==
    /// Stops the cleanup task and releases every entry.
    ///
    /// Idempotent; returns once the cleanup task has exited.
    pub async fn close(&self) {
        let handle = self.cleanup.lock().take();
        if let Some(handle) = handle {
            handle.stop().await;
        }
        self.clear();
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.shared.entries.read().len())
            .field("default_ttl", &self.shared.default_ttl)
            .field("max_entries", &self.shared.max_entries)
            .finish()
    }
}
