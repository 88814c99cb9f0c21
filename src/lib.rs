//! Stripe Relay - Webhook Validation & Event Dispatch
//!
//! This crate receives Stripe webhook notifications over HTTP, validates
//! that each one is genuine and environment-appropriate, re-confirms it
//! against the Stripe API, and republishes confirmed events to internal
//! subscribers under a stable topic.
//!
//! # Architecture
//!
//! ```text
//! Stripe ──▶ POST /webhooks/stripe ──▶ Validator ──▶ GET /v1/events/{id}
//!                    │                     │                 │
//!                    ▼                     ▼                 ▼
//!              403 (invalid)          mode gate        VerifiedEvent
//!                                                           │
//!                                                           ▼
//!                                            Publisher ──▶ subscribers
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use stripe_relay::config::{StaticSettings, WebhookSettings};
//! use stripe_relay::webhook::{
//!     webhook_router, BroadcastPublisher, StripeEventVerifier, VerifierConfig, WebhookState,
//!     WEBHOOK_TOPIC,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let publisher = Arc::new(BroadcastPublisher::new());
//!     let mut events = publisher.subscribe(WEBHOOK_TOPIC);
//!
//!     let state = Arc::new(WebhookState::new(
//!         Arc::new(StaticSettings(WebhookSettings::from_env()?)),
//!         Arc::new(StripeEventVerifier::new(VerifierConfig::from_env()?)),
//!         publisher,
//!     ));
//!
//!     tokio::spawn(async move {
//!         while let Ok(message) = events.recv().await {
//!             println!("confirmed event: {}", message.event_type);
//!         }
//!     });
//!
//!     let app = webhook_router(state);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod webhook;

// Re-exports for convenience
pub use config::{Mode, SettingsProvider, WebhookSettings};
pub use error::{Error, PublishError, RejectReason, Result, VerifyError};
pub use webhook::{EventPublisher, EventVerifier, Notification, VerifiedEvent, WebhookMessage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
