//! Configuration Module
//!
//! Cache policy (`CacheConfig`) fixed at construction time, and process
//! configuration (`Config`) loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default interval between background expiry sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

// == Cache Config ==
/// Policy for a single cache or shard router.
///
/// Read once when the cache is built and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// TTL applied to writes that do not specify one; zero means no expiry
    pub default_ttl: Duration,
    /// Maximum number of entries; zero means unbounded
    pub max_entries: usize,
    /// Number of independently locked shards (routers only)
    pub shard_count: usize,
    /// Interval between background sweeps; zero disables the scheduler
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a config with the given default TTL and otherwise default policy.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl,
            ..Self::default()
        }
    }

    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_shards(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Returns true when a capacity bound is configured.
    pub fn is_bounded(&self) -> bool {
        self.max_entries > 0
    }

    // == Validate ==
    /// Checks the config for values no cache can be built from.
    ///
    /// Constructors normalise instead of failing; this is for callers that
    /// prefer to reject bad input up front (e.g. environment parsing).
    pub fn validate(&self) -> Result<()> {
        if self.shard_count == 0 {
            return Err(CacheError::InvalidConfig(
                "shard_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::ZERO,
            max_entries: 0,
            shard_count: 1,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

// == Process Config ==
/// Process configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Diagnostics HTTP server port
    pub server_port: u16,
    /// Background cleanup interval shared by every cache
    pub cleanup_interval: Duration,
    /// Shard count for the high-cardinality caches
    pub shard_count: usize,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - Diagnostics HTTP port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds, 0 disables (default: 60)
    /// - `SHARD_COUNT` - Shards for large caches (default: 4)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let config = Self {
            server_port: parse_var(&lookup, "SERVER_PORT", defaults.server_port)?,
            cleanup_interval: Duration::from_secs(parse_var(
                &lookup,
                "CLEANUP_INTERVAL",
                defaults.cleanup_interval.as_secs(),
            )?),
            shard_count: parse_var(&lookup, "SHARD_COUNT", defaults.shard_count)?,
        };

        if config.shard_count == 0 {
            return Err(CacheError::InvalidConfig(
                "SHARD_COUNT must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }

    /// Cache policy for one preset, inheriting process-wide settings.
    pub fn cache_config(&self, default_ttl: Duration, max_entries: usize, sharded: bool) -> CacheConfig {
        CacheConfig::new(default_ttl)
            .with_max_entries(max_entries)
            .with_shards(if sharded { self.shard_count } else { 1 })
            .with_cleanup_interval(self.cleanup_interval)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            shard_count: 4,
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            CacheError::InvalidConfig(format!("{} has an invalid value: {:?}", name, raw))
        }),
    }
}
