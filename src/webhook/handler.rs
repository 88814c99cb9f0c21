//! HTTP endpoint for inbound Stripe webhook notifications.
//!
//! Orchestrates the pipeline: decode the body, read the current settings,
//! validate, log, publish, respond. Every collaborator is injected through
//! [`WebhookState`] at construction time; the handler holds no global state.
//!
//! ```text
//! POST body ──▶ Notification ──▶ Validator ──▶ Stripe /v1/events/{id}
//!                                   │                  │
//!                              reject (403)       VerifiedEvent
//!                                                      │
//!                                              WebhookMessage ──▶ Publisher
//!                                                      │
//!                                                 200 "Okay"
//! ```

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use tracing::{error, info};

use crate::config::SettingsProvider;
use crate::error::RejectReason;
use crate::handlers::RelayStats;
use crate::webhook::event::{Notification, WebhookMessage, WEBHOOK_TOPIC};
use crate::webhook::publisher::EventPublisher;
use crate::webhook::validator::validate;
use crate::webhook::verifier::EventVerifier;

/// Everything the webhook endpoint needs, injected at construction.
pub struct WebhookState {
    /// Per-request settings source
    pub settings: Arc<dyn SettingsProvider>,
    /// Remote event verifier
    pub verifier: Arc<dyn EventVerifier>,
    /// Downstream publish capability
    pub publisher: Arc<dyn EventPublisher>,
    /// Throughput counters, shared with the status route
    pub stats: Arc<RelayStats>,
}

impl WebhookState {
    /// Wire up the endpoint's collaborators.
    pub fn new(
        settings: Arc<dyn SettingsProvider>,
        verifier: Arc<dyn EventVerifier>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            settings,
            verifier,
            publisher,
            stats: Arc::new(RelayStats::new()),
        }
    }

    /// Share an existing counter set instead of a fresh one.
    pub fn with_stats(mut self, stats: Arc<RelayStats>) -> Self {
        self.stats = stats;
        self
    }
}

/// Webhook endpoint handler.
///
/// Responds `200` with body `"Okay"` once the event is confirmed and
/// republished, `403` with an empty body for anything that fails
/// validation, and `500` only when an authentic event cannot be handed to
/// the publisher. Stripe retries non-2xx deliveries on its own schedule;
/// the relay never retries.
///
/// # Route
/// `POST /webhooks/stripe`
pub async fn stripe_webhook_handler(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> Response {
    state.stats.record_received();

    // Settings are re-read on every request; a mode flip applies immediately
    let settings = state.settings.current();

    let outcome = match Notification::from_bytes(&body) {
        Ok(notification) => {
            match validate(settings.mode, &notification, state.verifier.as_ref()).await {
                Ok(event) => Ok((event, notification.data)),
                Err(reason) => Err(reason),
            }
        }
        Err(e) => Err(RejectReason::Malformed(e.to_string())),
    };

    let (event, data) = match outcome {
        Ok(confirmed) => confirmed,
        Err(reason) => {
            state.stats.record_rejected();
            error!(
                reason = %reason,
                body = %String::from_utf8_lossy(&body),
                "Invalid webhook event"
            );
            return StatusCode::FORBIDDEN.into_response();
        }
    };

    state.stats.record_accepted();
    if settings.log_webhooks {
        info!(event = %event, "Stripe webhook received event");
    }

    let message = WebhookMessage::new(event, data);
    if let Err(e) = state.publisher.publish(WEBHOOK_TOPIC, message).await {
        // An authentic event that cannot be republished is a server fault,
        // not a validation failure
        error!(error = %e, "Failed to publish verified webhook event");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    state.stats.record_published();

    (StatusCode::OK, "Okay").into_response()
}

/// Create the webhook router.
///
/// # Routes
/// - `POST /webhooks/stripe`
pub fn webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/webhooks/stripe", post(stripe_webhook_handler))
        .with_state(state)
}
