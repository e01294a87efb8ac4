//! Error types for card construction and webhook delivery.

use thiserror::Error;

/// Errors raised while building or delivering a connector card.
///
/// Misuse of the builders surfaces as [`TeamsError::InvalidArgument`] before
/// any network activity. Every other variant describes a failed delivery.
#[derive(Debug, Error)]
pub enum TeamsError {
    /// A builder or constructor was given an unusable argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The webhook answered with a non-2xx status
    #[error("Teams delivery failed: webhook returned {status}: {body}")]
    Status {
        /// HTTP status code returned by the webhook
        status: u16,
        /// Response body, empty if it could not be read
        body: String,
    },

    /// The connection to the webhook could not be established
    #[error("Teams delivery failed: connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// The request did not complete within the configured timeout
    #[error("Teams delivery failed: timed out after {timeout_secs} seconds")]
    Timeout {
        /// Configured request timeout
        timeout_secs: u64,
        #[source]
        source: reqwest::Error,
    },

    /// Any other transport failure
    #[error("Teams delivery failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The payload could not be encoded as JSON
    #[error("Teams delivery failed: could not encode payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A background send panicked or was cancelled
    #[error("Teams delivery failed: background send did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl TeamsError {
    /// Whether this error came out of a delivery attempt rather than builder misuse.
    #[must_use]
    pub const fn is_delivery_failure(&self) -> bool {
        !matches!(self, Self::InvalidArgument(_))
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = TeamsError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_carries_code_and_body() {
        let err = TeamsError::Status {
            status: 404,
            body: "Webhook not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Teams delivery failed: webhook returned 404: Webhook not found"
        );
        assert!(err.is_delivery_failure());
    }

    #[test]
    fn test_invalid_argument_is_not_delivery_failure() {
        let err = TeamsError::invalid("webhook URL cannot be empty");
        assert_eq!(err.to_string(), "invalid argument: webhook URL cannot be empty");
        assert!(!err.is_delivery_failure());
    }
}
