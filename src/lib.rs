//! Scrobble Cache - caching engine for a music-tracking chat bot
//!
//! Provides TTL expiry, capacity-bounded LRU eviction, sharding, load-through
//! access and stats for caching upstream API responses.

pub mod api;
pub mod cache;
pub mod caches;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod tasks;

pub use api::AppState;
pub use cache::{derive_key, Cache, CacheStats, KeyParams, ShardedCache, Ttl};
pub use caches::ApiCaches;
pub use config::{CacheConfig, Config};
