//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, capacity-bounded LRU
//! eviction, sharding, load-through access and key derivation.

mod entry;
mod key;
mod loader;
mod shard;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::{CacheEntry, Ttl};
pub use key::{derive_key, KeyParams, DIGEST_BYTES, MAX_READABLE_KEY_LEN};
pub use loader::{get_or_fetch, Store};
pub use shard::ShardedCache;
pub use stats::CacheStats;
pub use store::{Cache, SWEEP_BATCH};
