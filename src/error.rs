//! Error types for the Stripe relay.
//!
//! This module provides the error type hierarchy using `thiserror`. The
//! webhook pipeline keeps rejection causes distinguishable for logging even
//! though the HTTP layer collapses all of them into a single 403 response.

use thiserror::Error;

use crate::config::Mode;

/// The main error type for relay operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or parsing errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote event verification errors
    #[error("Verification error: {0}")]
    Verify(#[from] VerifyError),

    /// Event publishing errors
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

/// Configuration errors raised when loading relay settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configured API mode is neither `live` nor `test`
    #[error("Unrecognized API mode {0:?} (expected \"live\" or \"test\")")]
    InvalidMode(String),

    /// A required environment variable is not set
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),
}

/// Errors from the remote event verification round-trip
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The provider has no record of the event id
    #[error("No such event: {0}")]
    UnknownEvent(String),

    /// The provider answered with a non-success status
    #[error("Stripe API error {status}: {message}")]
    Api {
        /// HTTP status code returned by the provider
        status: u16,
        /// Error body returned by the provider
        message: String,
    },

    /// The lookup did not complete within the configured bound
    #[error("Event lookup timed out")]
    Timeout,

    /// Transport-level failure reaching the provider
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered but the body was not a decodable event
    #[error("Undecodable event response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for VerifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            VerifyError::Timeout
        } else if err.is_decode() {
            VerifyError::InvalidResponse(err.to_string())
        } else {
            VerifyError::Network(err.to_string())
        }
    }
}

/// Errors from the downstream publish mechanism
#[derive(Error, Debug)]
pub enum PublishError {
    /// The topic's channel is no longer accepting messages
    #[error("Publish channel closed for topic {0:?}")]
    ChannelClosed(String),

    /// Delivery to the topic failed
    #[error("Delivery failed: {0}")]
    Delivery(String),
}

/// Why an inbound webhook notification was refused.
///
/// Every variant maps to the same external outcome (403, empty body) so the
/// sender cannot probe which check failed; logs retain the distinction,
/// including whether the remote lookup was attempted at all.
#[derive(Error, Debug)]
pub enum RejectReason {
    /// The request body did not decode as JSON
    #[error("Request body is not valid JSON: {0}")]
    Malformed(String),

    /// The notification carried no event id
    #[error("Event id missing from notification")]
    MissingId,

    /// The event's livemode flag contradicts the configured mode
    #[error("livemode={livemode} event does not match {mode} mode")]
    ModeMismatch {
        /// Mode the relay is configured for
        mode: Mode,
        /// Livemode flag the notification carried
        livemode: bool,
    },

    /// The gate passed but the provider could not confirm the event
    #[error("Event verification failed: {0}")]
    Verification(#[from] VerifyError),
}

impl RejectReason {
    /// Whether the rejection happened before any provider round-trip.
    pub fn rejected_locally(&self) -> bool {
        !matches!(self, RejectReason::Verification(_))
    }
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a generic error from a string
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        Error::Generic(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_error_display() {
        let err = VerifyError::UnknownEvent("evt_missing".to_string());
        assert_eq!(err.to_string(), "No such event: evt_missing");

        let err = VerifyError::Api {
            status: 401,
            message: "Invalid API key".to_string(),
        };
        assert!(err.to_string().contains("401"));
        assert!(err.to_string().contains("Invalid API key"));
    }

    #[test]
    fn test_reject_reason_display() {
        let err = RejectReason::ModeMismatch {
            mode: Mode::Live,
            livemode: false,
        };
        assert!(err.to_string().contains("livemode=false"));
        assert!(err.to_string().contains("live mode"));
    }

    #[test]
    fn test_reject_reason_locality() {
        assert!(RejectReason::MissingId.rejected_locally());
        assert!(RejectReason::Malformed("eof".to_string()).rejected_locally());
        assert!(!RejectReason::Verification(VerifyError::Timeout).rejected_locally());
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidMode("production".to_string());
        assert!(err.to_string().contains("production"));
    }

    #[test]
    fn test_error_wrapping() {
        let err: Error = VerifyError::Timeout.into();
        assert!(err.to_string().contains("timed out"));

        let err: Error = PublishError::Delivery("queue full".to_string()).into();
        assert!(err.to_string().contains("queue full"));
    }

    #[test]
    fn test_generic_error() {
        let err = Error::generic("something went wrong");
        assert_eq!(err.to_string(), "something went wrong");
    }
}
