//! Wire types for the webhook pipeline.
//!
//! [`Notification`] is what the outside world POSTs at the endpoint and is
//! deliberately lenient; [`VerifiedEvent`] is what Stripe's API returns for
//! an event id and is the only thing ever republished downstream.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder event id Stripe sends from the dashboard's "Send test
/// webhook" button. Notifications carrying it skip the mode gate but still
/// have to survive the remote lookup.
pub const TEST_EVENT_ID: &str = "evt_00000000000000";

/// Topic under which confirmed events are republished.
pub const WEBHOOK_TOPIC: &str = "stripe.webhook";

/// Raw decoded webhook request body.
///
/// Anything can be POSTed at a public endpoint, so every field has a
/// default instead of failing deserialization; the validator decides what
/// is acceptable. Unknown keys are ignored. Nothing here is trusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Notification {
    /// Provider-assigned event identifier
    #[serde(default)]
    pub id: Option<String>,

    /// Whether the event claims to originate from the production environment
    #[serde(default)]
    pub livemode: bool,

    /// Dot-namespaced event category, e.g. `charge.succeeded`
    #[serde(rename = "type", default)]
    pub event_type: String,

    /// Event payload, opaque to the relay
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Notification {
    /// Parse from raw JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// The event id, if present and non-empty.
    pub fn event_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Authoritative event record fetched from the Stripe API.
///
/// The published payload's authenticity rests entirely on this record
/// coming from the provider, never on the caller-supplied body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedEvent {
    /// Unique identifier for the event
    pub id: String,

    /// Type of event
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time of event creation (Unix timestamp)
    pub created: i64,

    /// API version used to render data
    #[serde(default)]
    pub api_version: Option<String>,

    /// Whether this is a live mode event
    pub livemode: bool,

    /// Number of times Stripe has attempted to deliver
    #[serde(default)]
    pub pending_webhooks: u32,

    /// Object containing event data
    pub data: EventData,

    /// Request that caused the event (if applicable)
    #[serde(default)]
    pub request: Option<EventRequest>,
}

impl VerifiedEvent {
    /// Parse from raw JSON bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Renders as compact JSON, which is what the info log records for
/// accepted webhooks.
impl fmt::Display for VerifiedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => f.write_str(&json),
            Err(_) => write!(f, "<unrenderable event {}>", self.id),
        }
    }
}

/// Event data container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventData {
    /// The actual event object (charge, subscription, invoice, etc.)
    pub object: serde_json::Value,

    /// Previous values for updated fields (only in *.updated events)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<serde_json::Value>,
}

/// Request that triggered the event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRequest {
    /// Request ID
    pub id: Option<String>,
    /// Idempotency key used in the request
    pub idempotency_key: Option<String>,
}

/// Message republished to subscribers after a webhook is confirmed.
///
/// Created once per successful validation and handed to the publisher; the
/// relay keeps no further reference.
#[derive(Debug, Clone, Serialize)]
pub struct WebhookMessage {
    /// Event type, taken from the verified record
    pub event_type: String,

    /// The `data` field of the inbound notification, as delivered
    pub data: serde_json::Value,

    /// Full verified event fetched from the provider
    pub event: VerifiedEvent,
}

impl WebhookMessage {
    /// Build a message from the verified event and the notification's data.
    pub fn new(event: VerifiedEvent, data: serde_json::Value) -> Self {
        Self {
            event_type: event.event_type.clone(),
            data,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_notification_full_body() {
        let json = r#"{
            "id": "evt_123",
            "livemode": false,
            "type": "charge.succeeded",
            "data": {"object": {"id": "ch_123", "amount": 2000}}
        }"#;

        let notification = Notification::from_bytes(json.as_bytes()).unwrap();
        assert_eq!(notification.event_id(), Some("evt_123"));
        assert!(!notification.livemode);
        assert_eq!(notification.event_type, "charge.succeeded");
        assert_eq!(notification.data["object"]["amount"], json!(2000));
    }

    #[test]
    fn test_notification_tolerates_missing_fields() {
        let notification = Notification::from_bytes(b"{}").unwrap();
        assert_eq!(notification.event_id(), None);
        assert!(!notification.livemode);
        assert_eq!(notification.event_type, "");
        assert!(notification.data.is_null());
    }

    #[test]
    fn test_notification_empty_id_is_no_id() {
        let notification = Notification::from_bytes(br#"{"id": ""}"#).unwrap();
        assert!(notification.id.is_some());
        assert_eq!(notification.event_id(), None);
    }

    #[test]
    fn test_notification_rejects_non_json() {
        assert!(Notification::from_bytes(b"not json at all").is_err());
    }

    #[test]
    fn test_verified_event_parsing() {
        let json = r#"{
            "id": "evt_1234567890",
            "type": "charge.succeeded",
            "created": 1614556800,
            "livemode": true,
            "pending_webhooks": 2,
            "data": {"object": {"id": "ch_1234567890", "status": "succeeded"}},
            "request": {"id": "req_abc", "idempotency_key": null}
        }"#;

        let event = VerifiedEvent::from_bytes(json.as_bytes()).unwrap();
        assert_eq!(event.id, "evt_1234567890");
        assert_eq!(event.event_type, "charge.succeeded");
        assert!(event.livemode);
        assert_eq!(event.pending_webhooks, 2);
        assert_eq!(event.request.unwrap().id.unwrap(), "req_abc");
    }

    #[test]
    fn test_verified_event_display_is_json() {
        let event = VerifiedEvent {
            id: "evt_render".to_string(),
            event_type: "ping".to_string(),
            created: 1614556800,
            api_version: None,
            livemode: false,
            pending_webhooks: 0,
            data: EventData {
                object: json!({}),
                previous_attributes: None,
            },
            request: None,
        };

        let rendered = event.to_string();
        assert!(rendered.contains("\"id\":\"evt_render\""));
        assert!(rendered.contains("\"type\":\"ping\""));
        // Display output must round-trip through the same schema
        assert!(VerifiedEvent::from_bytes(rendered.as_bytes()).is_ok());
    }

    #[test]
    fn test_message_takes_type_from_verified_event() {
        let event = VerifiedEvent {
            id: "evt_1".to_string(),
            event_type: "invoice.paid".to_string(),
            created: 0,
            api_version: None,
            livemode: false,
            pending_webhooks: 0,
            data: EventData {
                object: json!({"id": "in_1"}),
                previous_attributes: None,
            },
            request: None,
        };

        let caller_data = json!({"object": {"id": "in_1", "forged": true}});
        let message = WebhookMessage::new(event, caller_data.clone());

        assert_eq!(message.event_type, "invoice.paid");
        assert_eq!(message.data, caller_data);
        // The verified record is carried alongside, untouched by the caller
        assert_eq!(message.event.data.object, json!({"id": "in_1"}));
    }
}
