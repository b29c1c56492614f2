//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

// == TTL ==
/// Time-to-live requested for a single write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache's default TTL
    #[default]
    Default,
    /// Never expire, regardless of the cache default
    Never,
    /// Expire after the given duration; zero falls back to the default
    After(Duration),
}

impl Ttl {
    /// Resolves to the effective lifetime, or None for a permanent entry.
    ///
    /// A zero default TTL means writes using the default never expire.
    pub fn resolve(self, default_ttl: Duration) -> Option<Duration> {
        let ttl = match self {
            Ttl::Never => return None,
            Ttl::After(ttl) if !ttl.is_zero() => ttl,
            Ttl::After(_) | Ttl::Default => default_ttl,
        };
        (!ttl.is_zero()).then_some(ttl)
    }

    /// Absolute expiry instant when written at `now`.
    pub fn expires_at(self, default_ttl: Duration, now: Instant) -> Option<Instant> {
        // An unrepresentable deadline is as good as never.
        self.resolve(default_ttl).and_then(|ttl| now.checked_add(ttl))
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Ttl::Default
        } else {
            Ttl::After(ttl)
        }
    }
}

// == Cache Entry ==
/// A single cache slot.
///
/// The value is immutable once stored; replacing a key creates a new entry.
/// `last_access` is a stamp from the owning cache's logical clock, so it can be
/// bumped under a shared lock.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Absolute expiry, None = no expiration
    pub expires_at: Option<Instant>,
    last_access: AtomicU64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `expires_at` - Optional absolute expiry
    /// * `stamp` - Access stamp at creation time
    pub fn new(value: V, expires_at: Option<Instant>, stamp: u64) -> Self {
        Self {
            value,
            expires_at,
            last_access: AtomicU64::new(stamp),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired as of `now`.
    ///
    /// Boundary condition: an entry is expired once `now` reaches its expiry.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Access Stamp ==
    /// Records an access with the given stamp.
    pub fn touch(&self, stamp: u64) {
        self.last_access.fetch_max(stamp, Ordering::Relaxed);
    }

    /// Stamp of the most recent access.
    pub fn last_access(&self) -> u64 {
        self.last_access.load(Ordering::Relaxed)
    }
}
