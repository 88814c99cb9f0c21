//! Remote event verification against the Stripe API.
//!
//! The relay does not trust anything in the request body. A notification
//! that looks plausible is re-fetched from `GET /v1/events/{id}` and only
//! the record the provider returns is ever republished.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ConfigError, VerifyError};
use crate::webhook::event::VerifiedEvent;

/// Default Stripe API endpoint.
const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

/// Bound on the verification round-trip. A lookup that exceeds it counts as
/// a verification failure; Stripe redelivers on non-2xx.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the authoritative record for an event id from the system of
/// record.
#[async_trait]
pub trait EventVerifier: Send + Sync {
    /// Retrieve the event with the given id.
    ///
    /// Fails when the id is unknown, the credentials are rejected, or the
    /// provider is unreachable within the configured bound.
    async fn retrieve(&self, id: &str) -> Result<VerifiedEvent, VerifyError>;
}

/// Credentials and endpoint for [`StripeEventVerifier`].
#[derive(Debug, Clone)]
pub struct VerifierConfig {
    /// Secret API key (`sk_live_...` or `sk_test_...`)
    pub secret_key: String,

    /// Base URL for the Stripe API
    pub api_base_url: String,

    /// Round-trip timeout for the event lookup
    pub timeout: Duration,
}

impl VerifierConfig {
    /// Create a configuration with the default endpoint and timeout.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `STRIPE_SECRET_KEY` (required)
    /// - `STRIPE_API_BASE_URL` (optional endpoint override)
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| ConfigError::MissingVar("STRIPE_SECRET_KEY"))?;

        let mut config = Self::new(secret_key);
        if let Ok(url) = std::env::var("STRIPE_API_BASE_URL") {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }

        Ok(config)
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the lookup timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Verifier backed by the Stripe events endpoint.
pub struct StripeEventVerifier {
    config: VerifierConfig,
    http_client: reqwest::Client,
}

impl StripeEventVerifier {
    /// Create a verifier with the given configuration.
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EventVerifier for StripeEventVerifier {
    async fn retrieve(&self, id: &str) -> Result<VerifiedEvent, VerifyError> {
        let url = format!("{}/v1/events/{}", self.config.api_base_url, id);

        // Stripe authenticates with the secret key as the basic-auth user
        let response = self
            .http_client
            .get(&url)
            .basic_auth(&self.config.secret_key, Option::<&str>::None)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(VerifyError::UnknownEvent(id.to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(VerifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<VerifiedEvent>()
            .await
            .map_err(|e| VerifyError::InvalidResponse(e.to_string()))
    }
}
