//! API Handlers
//!
//! HTTP request handlers for each diagnostics endpoint.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::caches::ApiCaches;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{CacheStatsResponse, ClearResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// The caches are owned by the process and shared by `Arc`; handlers only
/// read counters or clear whole caches.
#[derive(Clone)]
pub struct AppState {
    pub caches: Arc<ApiCaches>,
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new AppState around already-built caches.
    pub fn new(caches: Arc<ApiCaches>) -> Self {
        Self {
            caches,
            started_at: Instant::now(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(ApiCaches::new(config)))
    }
}

/// Handler for GET /stats
///
/// Returns every cache's counters plus totals.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(&state.caches.stats()))
}

/// Handler for GET /stats/:name
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<CacheStatsResponse>> {
    let cache = state
        .caches
        .find(&name)
        .ok_or_else(|| CacheError::UnknownCache(name.clone()))?;

    Ok(Json(CacheStatsResponse::new(name, &cache.stats())))
}

/// Handler for GET /report
///
/// Plain-text table, the same one the bot's status command prints.
pub async fn report_handler(State(state): State<AppState>) -> String {
    state.caches.report()
}

/// Handler for DELETE /caches/:name
///
/// Drops every entry of one cache; counters are kept.
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cache = state
        .caches
        .find(&name)
        .ok_or_else(|| CacheError::UnknownCache(name.clone()))?;

    let removed = cache.len();
    cache.clear();
    tracing::info!("Cleared cache '{}' ({} entries)", name, removed);

    Ok(Json(ClearResponse::new(name, removed)))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.started_at.elapsed().as_secs()))
}
