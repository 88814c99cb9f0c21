//! Stripe Webhook Validation & Dispatch Pipeline
//!
//! This module implements the core of the relay:
//!
//! - **Shape check**: notifications without an event id are refused outright
//! - **Mode gate**: the event's `livemode` flag must match the configured
//!   operating mode; the dashboard test id is the one exception
//! - **Remote confirmation**: the event is re-fetched from the Stripe API,
//!   and only the provider's record is republished
//! - **Dispatch**: one message per confirmed event, published under
//!   [`WEBHOOK_TOPIC`](event::WEBHOOK_TOPIC) to whatever
//!   [`EventPublisher`](publisher::EventPublisher) was injected
//!
//! # Security
//!
//! The request body is never trusted: a forged notification either fails
//! the local gate (and never generates provider traffic) or fails the
//! remote lookup. All rejections collapse to the same 403 response so the
//! sender cannot probe which check failed.

pub mod event;
pub mod handler;
pub mod publisher;
pub mod validator;
pub mod verifier;

// Re-export commonly used items
pub use event::{
    EventData, EventRequest, Notification, VerifiedEvent, WebhookMessage, TEST_EVENT_ID,
    WEBHOOK_TOPIC,
};
pub use handler::{stripe_webhook_handler, webhook_router, WebhookState};
pub use publisher::{BroadcastPublisher, EventPublisher};
pub use validator::validate;
pub use verifier::{EventVerifier, StripeEventVerifier, VerifierConfig};
