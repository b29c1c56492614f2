//! Stats Reporting
//!
//! Read-only access to cache counters for operational reports.

use std::fmt::Write;
use std::hash::Hash;

use serde::Serialize;

use crate::cache::{Cache, CacheStats, ShardedCache};

// == Managed Cache ==
/// Type-erased view of a cache for diagnostics.
pub trait ManagedCache: Send + Sync {
    fn stats(&self) -> CacheStats;

    fn len(&self) -> usize;

    /// Drops every entry, keeping the counters.
    fn clear(&self);
}

impl<K, V> ManagedCache for Cache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn stats(&self) -> CacheStats {
        Cache::stats(self)
    }

    fn len(&self) -> usize {
        Cache::len(self)
    }

    fn clear(&self) {
        Cache::clear(self)
    }
}

impl<K, V> ManagedCache for ShardedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn stats(&self) -> CacheStats {
        ShardedCache::stats(self)
    }

    fn len(&self) -> usize {
        ShardedCache::len(self)
    }

    fn clear(&self) {
        ShardedCache::clear(self)
    }
}

// == Named Stats ==
/// A cache's snapshot together with the name it is reported under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedStats {
    pub name: String,
    #[serde(flatten)]
    pub stats: CacheStats,
}

impl NamedStats {
    pub fn new(name: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            name: name.into(),
            stats,
        }
    }
}

const HEADERS: [&str; 6] = ["cache", "hits", "misses", "loads", "evictions", "size"];

// == Render Table ==
/// Renders snapshots as a fixed-width text table, one row per cache.
pub fn render_table(rows: &[NamedStats]) -> String {
    let name_width = rows
        .iter()
        .map(|row| row.name.len())
        .chain([HEADERS[0].len(), 10])
        .max()
        .unwrap_or(10);

    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        "{:<nw$} {:<8} {:<8} {:<8} {:<10} {:<6}",
        HEADERS[0],
        HEADERS[1],
        HEADERS[2],
        HEADERS[3],
        HEADERS[4],
        HEADERS[5],
        nw = name_width
    );
    let _ = writeln!(out, "{}", "-".repeat(name_width + 43));

    for row in rows {
        let s = &row.stats;
        let _ = writeln!(
            out,
            "{:<nw$} {:<8} {:<8} {:<8} {:<10} {:<6}",
            row.name,
            s.hits,
            s.misses,
            s.loads,
            s.evictions,
            s.current_size,
            nw = name_width
        );
    }

    out
}
