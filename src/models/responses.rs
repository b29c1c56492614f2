//! Response DTOs for the diagnostics API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::report::NamedStats;

/// Stats for one cache (GET /stats/:name, and rows of GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    /// Report name of the cache
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    pub loads: u64,
    pub evictions: u64,
    /// Current number of entries
    pub size: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl CacheStatsResponse {
    /// Creates a response row from a cache snapshot
    pub fn new(name: impl Into<String>, stats: &CacheStats) -> Self {
        Self {
            name: name.into(),
            hits: stats.hits,
            misses: stats.misses,
            loads: stats.loads,
            evictions: stats.evictions,
            size: stats.current_size,
            hit_rate: stats.hit_rate(),
        }
    }
}

impl From<&NamedStats> for CacheStatsResponse {
    fn from(row: &NamedStats) -> Self {
        Self::new(row.name.clone(), &row.stats)
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// One row per cache
    pub caches: Vec<CacheStatsResponse>,
    /// Sum over every cache
    pub totals: CacheStatsResponse,
}

impl StatsResponse {
    /// Creates a new StatsResponse, computing totals
    pub fn new(rows: &[NamedStats]) -> Self {
        let totals: CacheStats = rows.iter().map(|row| row.stats).sum();
        Self {
            caches: rows.iter().map(CacheStatsResponse::from).collect(),
            totals: CacheStatsResponse::new("total", &totals),
        }
    }
}

/// Response body for clearing a cache (DELETE /caches/:name)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Success message
    pub message: String,
    /// The cache that was cleared
    pub name: String,
    /// Number of entries dropped
    pub removed: usize,
}

impl ClearResponse {
    pub fn new(name: impl Into<String>, removed: usize) -> Self {
        let name = name.into();
        Self {
            message: format!("Cache '{}' cleared", name),
            name,
            removed,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    /// Seconds since the process started serving
    pub uptime_secs: u64,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy(uptime_secs: u64) -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            uptime_secs,
        }
    }
}
