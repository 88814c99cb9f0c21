//! Status and health check handlers for the relay.
//!
//! - `/health` - Simple liveness check for systemd/load balancers
//! - `/status` - Relay version, uptime, and webhook counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Server version from Cargo.toml
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Server name from Cargo.toml
pub const SERVER_NAME: &str = env!("CARGO_PKG_NAME");

/// Health check response for simple liveness probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Health status (always "healthy" if responding)
    pub status: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Relay status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Server version (from Cargo.toml)
    pub version: String,

    /// Server name
    pub name: String,

    /// Server uptime in seconds
    pub uptime_seconds: u64,

    /// Webhook notifications received, valid or not
    pub webhooks_received: u64,

    /// Notifications that passed validation
    pub webhooks_accepted: u64,

    /// Notifications refused with a 403
    pub webhooks_rejected: u64,

    /// Confirmed events handed to the publisher
    pub events_published: u64,

    /// Server status (always "running" if responding)
    pub status: String,

    /// ISO8601 timestamp of when status was generated
    pub timestamp: String,
}

/// Webhook throughput counters shared between the endpoint handler and the
/// status route.
///
/// All fields are atomics; concurrent requests update them lock-free.
#[derive(Debug)]
pub struct RelayStats {
    start_time: Instant,
    received: AtomicU64,
    accepted: AtomicU64,
    rejected: AtomicU64,
    published: AtomicU64,
}

impl RelayStats {
    /// Create a fresh counter set; uptime starts now.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            received: AtomicU64::new(0),
            accepted: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
            published: AtomicU64::new(0),
        }
    }

    /// Server uptime in seconds.
    #[inline]
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Count an inbound notification, valid or not.
    #[inline]
    pub fn record_received(&self) -> u64 {
        self.received.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count a notification that passed validation.
    #[inline]
    pub fn record_accepted(&self) -> u64 {
        self.accepted.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count a refused notification.
    #[inline]
    pub fn record_rejected(&self) -> u64 {
        self.rejected.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Count a confirmed event handed to the publisher.
    #[inline]
    pub fn record_published(&self) -> u64 {
        self.published.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Total notifications received.
    #[inline]
    pub fn received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Total notifications accepted.
    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted.load(Ordering::Relaxed)
    }

    /// Total notifications rejected.
    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Total events published.
    #[inline]
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

impl Default for RelayStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Health check endpoint handler.
///
/// # Route
/// `GET /health`
pub async fn health_handler() -> impl IntoResponse {
    debug!("Health check requested");
    (StatusCode::OK, Json(HealthResponse::default()))
}

/// Relay status endpoint handler.
///
/// # Route
/// `GET /status`
pub async fn status_handler(State(stats): State<Arc<RelayStats>>) -> impl IntoResponse {
    debug!("Status check requested");

    let response = StatusResponse {
        version: SERVER_VERSION.to_string(),
        name: SERVER_NAME.to_string(),
        uptime_seconds: stats.uptime_seconds(),
        webhooks_received: stats.received(),
        webhooks_accepted: stats.accepted(),
        webhooks_rejected: stats.rejected(),
        events_published: stats.published(),
        status: "running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(response))
}

/// Create the status router with the health and status endpoints.
pub fn status_router(stats: Arc<RelayStats>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .with_state(stats)
}
