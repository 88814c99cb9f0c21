//! Relay configuration.
//!
//! The webhook pipeline never reads the environment directly. Settings are
//! loaded into [`WebhookSettings`] and exposed through a [`SettingsProvider`],
//! which the endpoint handler consults once per request so that a mode or
//! logging change takes effect without rebuilding the router.

use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Stripe API operating mode.
///
/// Live events are only accepted while in [`Mode::Live`] and sandbox events
/// while in [`Mode::Test`]; the dashboard test event is the one exception.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Production environment; only `livemode: true` events pass
    Live,
    /// Sandbox environment; only `livemode: false` events pass
    #[default]
    Test,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "live" => Ok(Mode::Live),
            "test" => Ok(Mode::Test),
            other => Err(ConfigError::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Live => f.write_str("live"),
            Mode::Test => f.write_str("test"),
        }
    }
}

/// Settings the webhook pipeline reads on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Operating mode the livemode gate checks against
    pub mode: Mode,
    /// When set, accepted events are logged at info level
    pub log_webhooks: bool,
}

impl WebhookSettings {
    /// Load settings from the environment.
    ///
    /// Reads:
    /// - `STRIPE_API_MODE`: `"live"` or `"test"`, defaults to test when unset
    /// - `STRIPE_LOG_WEBHOOKS`: `"true"`/`"1"` enables info logging
    pub fn from_env() -> Result<Self, ConfigError> {
        let mode = match std::env::var("STRIPE_API_MODE") {
            Ok(value) if !value.is_empty() => value.parse()?,
            _ => Mode::default(),
        };

        let log_webhooks = std::env::var("STRIPE_LOG_WEBHOOKS")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        Ok(Self { mode, log_webhooks })
    }
}

/// Read-only settings access for the webhook pipeline.
///
/// Implementations own the storage; the pipeline only ever reads.
pub trait SettingsProvider: Send + Sync {
    /// Current settings. Called once per inbound request, never cached.
    fn current(&self) -> WebhookSettings;
}

/// Settings fixed at construction time.
#[derive(Debug, Clone, Copy)]
pub struct StaticSettings(pub WebhookSettings);

impl SettingsProvider for StaticSettings {
    fn current(&self) -> WebhookSettings {
        self.0
    }
}

/// Settings that can be swapped while the relay is running.
///
/// Models a mutable configuration store: `set` replaces the settings and the
/// next request observes them.
#[derive(Debug, Default)]
pub struct SharedSettings {
    inner: RwLock<WebhookSettings>,
}

impl SharedSettings {
    /// Create a shared store holding the given settings.
    pub fn new(settings: WebhookSettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    /// Replace the stored settings.
    pub fn set(&self, settings: WebhookSettings) {
        *self.inner.write() = settings;
    }
}

impl SettingsProvider for SharedSettings {
    fn current(&self) -> WebhookSettings {
        *self.inner.read()
    }
}
