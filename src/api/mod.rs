//! API Module
//!
//! HTTP handlers and routing for the cache diagnostics API.
//!
//! # Endpoints
//! - `GET /stats` - Counters for every cache plus totals
//! - `GET /stats/:name` - Counters for one cache
//! - `GET /report` - Plain-text stats table
//! - `DELETE /caches/:name` - Clear one cache
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
