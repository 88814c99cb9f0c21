//! Named-topic publish mechanism for confirmed events.
//!
//! The endpoint handler depends on the [`EventPublisher`] capability, not on
//! any ambient registry; whoever constructs the handler decides where the
//! events go. The in-process implementation fans messages out over
//! `tokio::sync::broadcast` channels, one per topic.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::error::PublishError;
use crate::webhook::event::WebhookMessage;

/// Capacity of each topic channel. Subscribers that lag past this many
/// messages start dropping the oldest.
const CHANNEL_CAPACITY: usize = 256;

/// Publishes one message per confirmed event under a named topic.
///
/// At-most-once from the caller's point of view: `publish` resolves after a
/// single delivery attempt and the relay keeps no reference to the message.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a message under the given topic.
    async fn publish(&self, topic: &str, message: WebhookMessage) -> Result<(), PublishError>;
}

/// In-process publisher over broadcast channels.
///
/// Topics are created lazily on first use, by publisher or subscriber
/// alike. Publishing to a topic nobody listens on succeeds and the message
/// is dropped; that is the at-most-once contract, not an error.
#[derive(Default)]
pub struct BroadcastPublisher {
    topics: RwLock<HashMap<String, broadcast::Sender<WebhookMessage>>>,
}

impl BroadcastPublisher {
    /// Create a publisher with no topics yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a topic, creating it if needed.
    ///
    /// Messages published after this call are delivered to the returned
    /// receiver until it is dropped or lags past the channel capacity.
    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<WebhookMessage> {
        self.sender(topic).subscribe()
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<WebhookMessage> {
        if let Some(tx) = self.topics.read().get(topic) {
            return tx.clone();
        }

        let mut topics = self.topics.write();
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl EventPublisher for BroadcastPublisher {
    async fn publish(&self, topic: &str, message: WebhookMessage) -> Result<(), PublishError> {
        // send only errors when there are zero receivers; an empty topic is
        // a valid state for a broadcast bus
        let _ = self.sender(topic).send(message);
        Ok(())
    }
}
