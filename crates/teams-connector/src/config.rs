//! Transport configuration for webhook delivery.
//!
//! Options can be built in code, deserialized from a consumer's own config
//! file, or read from the environment:
//!
//! - `TEAMS_WEBHOOK_URL`: incoming webhook URL (used by `ConnectorCard::from_env`)
//! - `TEAMS_HTTP_PROXY` / `TEAMS_HTTPS_PROXY`: proxy URLs
//! - `TEAMS_TIMEOUT_SECS`: request timeout in seconds (default 60)
//! - `TEAMS_VERIFY_TLS`: set to "false" to skip certificate verification

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TeamsError};

/// Environment variable for the webhook URL.
pub const ENV_WEBHOOK_URL: &str = "TEAMS_WEBHOOK_URL";
const ENV_HTTP_PROXY: &str = "TEAMS_HTTP_PROXY";
const ENV_HTTPS_PROXY: &str = "TEAMS_HTTPS_PROXY";
const ENV_TIMEOUT_SECS: &str = "TEAMS_TIMEOUT_SECS";
const ENV_VERIFY_TLS: &str = "TEAMS_VERIFY_TLS";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// HTTP settings applied to every delivery of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Proxy for plain HTTP webhook URLs
    pub http_proxy: Option<String>,
    /// Proxy for HTTPS webhook URLs
    pub https_proxy: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to verify the webhook's TLS certificate
    pub verify_tls: bool,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            http_proxy: None,
            https_proxy: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            verify_tls: true,
        }
    }
}

impl TransportOptions {
    /// Load options from `TEAMS_*` environment variables, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let mut options = Self {
            http_proxy: non_empty_var(ENV_HTTP_PROXY),
            https_proxy: non_empty_var(ENV_HTTPS_PROXY),
            ..Self::default()
        };

        if let Some(raw) = non_empty_var(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>().ok().map(check_timeout) {
                Some(Ok(secs)) => options.timeout_secs = secs,
                _ => warn!(
                    value = %raw,
                    default = DEFAULT_TIMEOUT_SECS,
                    "Ignoring invalid TEAMS_TIMEOUT_SECS"
                ),
            }
        }

        if let Some(raw) = non_empty_var(ENV_VERIFY_TLS) {
            let raw = raw.trim();
            options.verify_tls = !(raw.eq_ignore_ascii_case("false")
                || raw.eq_ignore_ascii_case("no")
                || raw == "0");
        }

        debug!(
            timeout_secs = options.timeout_secs,
            verify_tls = options.verify_tls,
            proxy = options.has_proxy(),
            "Loaded Teams transport options"
        );

        options
    }

    #[must_use]
    pub fn with_http_proxy(mut self, url: impl Into<String>) -> Self {
        self.http_proxy = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_https_proxy(mut self, url: impl Into<String>) -> Self {
        self.https_proxy = Some(url.into());
        self
    }

    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    #[must_use]
    pub const fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether a proxy mapping applies (at least one proxy URL set).
    #[must_use]
    pub const fn has_proxy(&self) -> bool {
        self.http_proxy.is_some() || self.https_proxy.is_some()
    }

    /// Check the options before any request is made and parse the proxy URLs.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] for a zero timeout or a proxy
    /// URL that cannot be parsed.
    pub(crate) fn validate(&self) -> Result<Vec<reqwest::Proxy>> {
        check_timeout(self.timeout_secs)?;
        self.proxies()
    }

    /// Parse the configured proxy URLs.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] if a proxy URL cannot be parsed.
    pub(crate) fn proxies(&self) -> Result<Vec<reqwest::Proxy>> {
        let mut proxies = Vec::new();

        if let Some(url) = &self.http_proxy {
            let proxy = reqwest::Proxy::http(url.as_str())
                .map_err(|e| TeamsError::invalid(format!("invalid HTTP proxy `{url}`: {e}")))?;
            proxies.push(proxy);
        }

        if let Some(url) = &self.https_proxy {
            let proxy = reqwest::Proxy::https(url.as_str())
                .map_err(|e| TeamsError::invalid(format!("invalid HTTPS proxy `{url}`: {e}")))?;
            proxies.push(proxy);
        }

        Ok(proxies)
    }
}

/// A zero timeout would fail every request before it is sent.
fn check_timeout(secs: u64) -> Result<u64> {
    if secs == 0 {
        Err(TeamsError::invalid("request timeout must be at least 1 second"))
    } else {
        Ok(secs)
    }
}

/// Read the webhook URL from `TEAMS_WEBHOOK_URL`.
pub(crate) fn webhook_url_from_env() -> Option<String> {
    non_empty_var(ENV_WEBHOOK_URL)
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
