//! HTTP delivery of a serialized card to an incoming webhook.
//!
//! Each delivery is a single POST. Nothing is retried: the outcome of that one
//! request, success or failure, is handed back to the caller.

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::TransportOptions;
use crate::error::{Result, TeamsError};

/// Content type sent with every card.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Outcome of a successful webhook POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// HTTP status code returned by the webhook
    pub status: u16,
    /// Raw response body
    pub body: String,
}

impl Delivery {
    /// Whether the webhook accepted the card (status in 200..300).
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Build a client of either reqwest flavor from a request's options and start its POST.
///
/// The blocking and async builders share method names but no trait.
macro_rules! prepared_post {
    ($request:expr, $client:ty) => {{
        let request: &WebhookRequest = $request;
        let mut builder = <$client>::builder()
            .timeout(request.options.timeout())
            .danger_accept_invalid_certs(!request.options.verify_tls);
        for proxy in &request.proxies {
            builder = builder.proxy(proxy.clone());
        }
        builder
            .build()
            .map(|client| {
                client
                    .post(&request.url)
                    .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                    .body(request.body.clone())
            })
            .map_err(TeamsError::Http)
    }};
}

/// A fully prepared webhook request, detached from the card that produced it.
#[derive(Debug, Clone)]
pub(crate) struct WebhookRequest {
    url: String,
    body: String,
    options: TransportOptions,
    proxies: Vec<reqwest::Proxy>,
}

impl WebhookRequest {
    pub(crate) fn new(
        url: String,
        body: String,
        options: TransportOptions,
        proxies: Vec<reqwest::Proxy>,
    ) -> Self {
        Self {
            url,
            body,
            options,
            proxies,
        }
    }

    /// POST on the calling thread.
    pub(crate) fn send_blocking(self) -> Result<Delivery> {
        let post = prepared_post!(&self, reqwest::blocking::Client)?;
        self.log_start();

        let response = post.send().map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        self.finish(status, body)
    }

    /// POST on the async runtime.
    pub(crate) async fn send(self) -> Result<Delivery> {
        let post = prepared_post!(&self, reqwest::Client)?;
        self.log_start();

        let response = post.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        self.finish(status, body)
    }

    fn log_start(&self) {
        debug!(
            channel = "teams",
            webhook = %webhook_host(&self.url),
            bytes = self.body.len(),
            timeout_secs = self.options.timeout_secs,
            "Sending connector card"
        );
    }

    fn classify(&self, err: reqwest::Error) -> TeamsError {
        if err.is_timeout() {
            warn!(
                channel = "teams",
                timeout_secs = self.options.timeout_secs,
                "Teams webhook request timed out"
            );
            TeamsError::Timeout {
                timeout_secs: self.options.timeout_secs,
                source: err,
            }
        } else if err.is_connect() {
            warn!(channel = "teams", error = %err, "Could not connect to Teams webhook");
            TeamsError::Connect(err)
        } else {
            warn!(channel = "teams", error = %err, "Teams webhook request failed");
            TeamsError::Http(err)
        }
    }

    fn finish(&self, status: StatusCode, body: String) -> Result<Delivery> {
        if status.is_success() {
            debug!(channel = "teams", status = %status, "Connector card delivered");
            Ok(Delivery {
                status: status.as_u16(),
                body,
            })
        } else {
            warn!(
                channel = "teams",
                status = %status,
                body = %body,
                "Teams webhook request failed"
            );
            Err(TeamsError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Host part of a webhook URL. The path embeds the connector secret and is never logged.
pub(crate) fn webhook_host(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_owned))
        .unwrap_or_else(|| "<unparsed>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_success_range() {
        let ok = |status| Delivery {
            status,
            body: String::new(),
        };
        assert!(ok(200).is_success());
        assert!(ok(202).is_success());
        assert!(ok(299).is_success());
        assert!(!ok(199).is_success());
        assert!(!ok(300).is_success());
        assert!(!ok(404).is_success());
    }

    #[test]
    fn test_webhook_host_hides_path() {
        assert_eq!(
            webhook_host("https://contoso.webhook.office.com/webhookb2/secret-id/IncomingWebhook/abc"),
            "contoso.webhook.office.com"
        );
        assert_eq!(webhook_host("not a url"), "<unparsed>");
    }

    #[test]
    fn test_finish_maps_non_success_to_status_error() {
        let request = WebhookRequest::new(
            "https://example.com/hook".to_string(),
            "{}".to_string(),
            TransportOptions::default(),
            Vec::new(),
        );

        let delivery = request
            .finish(StatusCode::OK, "1".to_string())
            .expect("200 is delivered");
        assert_eq!(delivery.status, 200);
        assert_eq!(delivery.body, "1");

        let err = request
            .finish(StatusCode::BAD_REQUEST, "Summary or Text is required.".to_string())
            .unwrap_err();
        match err {
            TeamsError::Status { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Summary or Text is required.");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
