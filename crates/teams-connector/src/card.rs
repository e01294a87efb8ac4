//! The root connector card and its delivery entry points.

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{instrument, warn};

use crate::action::PotentialAction;
use crate::config::{self, TransportOptions};
use crate::error::{Result, TeamsError};
use crate::payload::{self, Payload};
use crate::section::CardSection;
use crate::transport::{webhook_host, Delivery, WebhookRequest};

const MESSAGE_CARD_TYPE: &str = "MessageCard";
const MESSAGE_CARD_CONTEXT: &str = "https://schema.org/extensions";

/// Theme color used for `color("red")`.
pub const RED: &str = "E81123";

/// A MessageCard addressed to one incoming webhook.
///
/// Builder methods mutate the card in place and return it for chaining.
/// Sections and actions are copied into the card when attached.
///
/// ```no_run
/// use teams_connector::{CardSection, ConnectorCard};
///
/// # fn main() -> teams_connector::Result<()> {
/// let mut section = CardSection::new();
/// section.activity_title("Deploy").add_fact("Environment", "staging");
///
/// let mut card = ConnectorCard::new("https://contoso.webhook.office.com/webhookb2/...")?;
/// card.title("Release 1.4.0")
///     .text("Rollout finished")
///     .color("#00FF00")
///     .add_section(section);
///
/// let delivery = card.send()?;
/// assert!(delivery.is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ConnectorCard {
    payload: Payload,
    webhook_url: String,
    options: TransportOptions,
    proxies: Vec<reqwest::Proxy>,
}

impl ConnectorCard {
    /// Create a card with default transport options.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] if `webhook_url` is empty.
    pub fn new(webhook_url: impl Into<String>) -> Result<Self> {
        Self::with_options(webhook_url, TransportOptions::default())
    }

    /// Create a card with explicit proxy, timeout and TLS settings.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] if `webhook_url` is empty, the
    /// timeout is zero, or a proxy URL cannot be parsed.
    pub fn with_options(webhook_url: impl Into<String>, options: TransportOptions) -> Result<Self> {
        let webhook_url = require_url(webhook_url.into())?;
        let proxies = options.validate()?;

        let mut payload = Payload::new();
        payload.insert(
            "@type".to_string(),
            Value::String(MESSAGE_CARD_TYPE.to_string()),
        );
        payload.insert(
            "@context".to_string(),
            Value::String(MESSAGE_CARD_CONTEXT.to_string()),
        );

        Ok(Self {
            payload,
            webhook_url,
            options,
            proxies,
        })
    }

    /// Create a card from `TEAMS_WEBHOOK_URL` and the other `TEAMS_*` variables.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] if `TEAMS_WEBHOOK_URL` is unset
    /// or empty, or a configured proxy URL cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let url = config::webhook_url_from_env().ok_or_else(|| {
            TeamsError::invalid(format!("{} is not set", config::ENV_WEBHOOK_URL))
        })?;
        Self::with_options(url, TransportOptions::from_env())
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set("text", text)
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.set("title", title)
    }

    /// Text shown in notifications and activity feeds.
    pub fn summary(&mut self, summary: impl Into<String>) -> &mut Self {
        self.set("summary", summary)
    }

    /// Set the accent color.
    ///
    /// `"red"` (any case) maps to [`RED`]; a leading `#` is dropped; anything
    /// else is stored as given.
    pub fn color(&mut self, color: impl AsRef<str>) -> &mut Self {
        let color = color.as_ref();
        let theme = if color.eq_ignore_ascii_case("red") {
            RED
        } else {
            color.strip_prefix('#').unwrap_or(color)
        };
        self.set("themeColor", theme)
    }

    /// Append a button opening `url`. Unlike sections, a card can hold many.
    pub fn add_link_button(&mut self, text: impl Into<String>, url: impl Into<String>) -> &mut Self {
        payload::append(
            &mut self.payload,
            "potentialAction",
            payload::view_action(text, url),
        );
        self
    }

    /// Point subsequent sends at another webhook.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] if `url` is empty; the current
    /// URL is kept.
    pub fn new_hook_url(&mut self, url: impl Into<String>) -> Result<&mut Self> {
        self.webhook_url = require_url(url.into())?;
        Ok(self)
    }

    pub fn add_section(&mut self, section: CardSection) -> &mut Self {
        payload::append(&mut self.payload, "sections", section.into_value());
        self
    }

    pub fn add_potential_action(&mut self, action: PotentialAction) -> &mut Self {
        payload::append(&mut self.payload, "potentialAction", action.into_value());
        self
    }

    /// The card document as it will be sent.
    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    #[must_use]
    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    #[must_use]
    pub const fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// Compact JSON body sent to the webhook.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.payload)?)
    }

    /// Indented JSON, for inspection.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::Serialization`] if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.payload)?)
    }

    /// Print the webhook URL and the indented payload to stdout.
    pub fn print(&self) {
        println!("hookurl: {}", self.webhook_url);
        match self.to_json_pretty() {
            Ok(body) => println!("payload: {body}"),
            Err(e) => warn!(error = %e, "Could not encode connector card"),
        }
    }

    /// POST the card and wait for the webhook's answer.
    ///
    /// Blocks the calling thread, so it refuses to run on a thread that is
    /// inside a Tokio runtime (including `spawn_blocking` threads); use
    /// [`send_async`](Self::send_async) there. The request is made once and
    /// never retried.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] when called inside a Tokio
    /// runtime, [`TeamsError::Status`] for a non-2xx answer,
    /// [`TeamsError::Connect`] or [`TeamsError::Timeout`] for transport
    /// failures, and [`TeamsError::Http`] for anything else.
    #[instrument(skip(self), fields(webhook = %webhook_host(&self.webhook_url)))]
    pub fn send(&self) -> Result<Delivery> {
        if tokio::runtime::Handle::try_current().is_ok() {
            warn!(channel = "teams", "Blocking send called inside a Tokio runtime");
            return Err(TeamsError::invalid(
                "send() blocks the thread; use send_async() inside a Tokio runtime",
            ));
        }
        self.request()?.send_blocking()
    }

    /// Send the card on a background task.
    ///
    /// The card is snapshotted before this returns, so later edits do not
    /// affect the pending delivery. Await the handle to observe the result:
    /// `card.send_async().await??`.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn send_async(&self) -> JoinHandle<Result<Delivery>> {
        let request = self.request();
        tokio::spawn(async move { request?.send().await })
    }

    fn request(&self) -> Result<WebhookRequest> {
        Ok(WebhookRequest::new(
            self.webhook_url.clone(),
            self.to_json()?,
            self.options.clone(),
            self.proxies.clone(),
        ))
    }

    fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.payload
            .insert(key.to_string(), Value::String(value.into()));
        self
    }
}

fn require_url(url: String) -> Result<String> {
    if url.trim().is_empty() {
        Err(TeamsError::invalid("webhook URL cannot be empty"))
    } else {
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HOOK: &str = "https://contoso.webhook.office.com/webhookb2/abc";

    #[test]
    fn test_empty_url_is_rejected() {
        for url in ["", "   "] {
            let err = ConnectorCard::new(url).unwrap_err();
            assert!(matches!(err, TeamsError::InvalidArgument(_)));
            assert!(err.to_string().contains("cannot be empty"));
        }
    }

    #[test]
    fn test_new_card_has_only_type_and_context() {
        let card = ConnectorCard::new(HOOK).unwrap();
        assert_eq!(
            Value::Object(card.payload().clone()),
            json!({"@type": "MessageCard", "@context": "https://schema.org/extensions"})
        );
        assert_eq!(card.webhook_url(), HOOK);
        assert_eq!(card.options(), &TransportOptions::default());
    }

    #[test]
    fn test_color_normalization() {
        let mut card = ConnectorCard::new(HOOK).unwrap();

        card.color("red");
        assert_eq!(card.payload()["themeColor"], "E81123");
        card.color("RED");
        assert_eq!(card.payload()["themeColor"], "E81123");
        card.color("#00FF00");
        assert_eq!(card.payload()["themeColor"], "00FF00");
        card.color("0000FF");
        assert_eq!(card.payload()["themeColor"], "0000FF");
    }

    #[test]
    fn test_scalar_fields_overwrite() {
        let mut card = ConnectorCard::new(HOOK).unwrap();
        card.title("a").text("b").summary("c").title("d");

        assert_eq!(card.payload()["title"], "d");
        assert_eq!(card.payload()["text"], "b");
        assert_eq!(card.payload()["summary"], "c");
        assert_eq!(card.payload().len(), 5);
    }

    #[test]
    fn test_link_buttons_append() {
        let mut card = ConnectorCard::new(HOOK).unwrap();
        card.add_link_button("One", "https://example.com/1")
            .add_link_button("Two", "https://example.com/2");

        let actions = card.payload()["potentialAction"].as_array().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0]["name"], "One");
        assert_eq!(actions[1]["target"], json!(["https://example.com/2"]));
    }

    #[test]
    fn test_link_buttons_and_actions_share_potential_action() {
        let mut card = ConnectorCard::new(HOOK).unwrap();
        card.add_link_button("Docs", "https://example.com/docs")
            .add_potential_action(PotentialAction::new("Comment"));

        let actions = card.payload()["potentialAction"].as_array().unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0]["@type"], "ViewAction");
        assert_eq!(actions[1]["@type"], "ActionCard");
    }

    #[test]
    fn test_new_hook_url() {
        let mut card = ConnectorCard::new(HOOK).unwrap();

        card.new_hook_url("https://example.com/other").unwrap();
        assert_eq!(card.webhook_url(), "https://example.com/other");

        let err = card.new_hook_url("").unwrap_err();
        assert!(matches!(err, TeamsError::InvalidArgument(_)));
        assert_eq!(card.webhook_url(), "https://example.com/other");
    }

    #[test]
    fn test_sections_are_snapshots() {
        let mut section = CardSection::new();
        section.title("before");
        let mut card = ConnectorCard::new(HOOK).unwrap();

        let mut later = section.clone();
        card.add_section(section);
        later.title("after");

        assert_eq!(card.payload()["sections"][0]["title"], "before");
    }

    #[test]
    fn test_invalid_proxy_fails_construction() {
        let options = TransportOptions::default().with_https_proxy("http://bad host:80");
        let err = ConnectorCard::with_options(HOOK, options).unwrap_err();
        assert!(matches!(err, TeamsError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_timeout_fails_construction() {
        let options = TransportOptions::default().with_timeout_secs(0);
        let err = ConnectorCard::with_options(HOOK, options).unwrap_err();
        assert!(matches!(err, TeamsError::InvalidArgument(_)));

        let options: TransportOptions = serde_json::from_str(r#"{"timeout_secs": 0}"#).unwrap();
        assert!(ConnectorCard::with_options(HOOK, options).is_err());
    }

    #[tokio::test]
    async fn test_blocking_send_inside_runtime_is_rejected() {
        let mut card = ConnectorCard::new("http://127.0.0.1:1/webhookb2/abc").unwrap();
        card.text("never sent");

        let err = card.send().unwrap_err();
        assert!(matches!(err, TeamsError::InvalidArgument(_)));
        assert!(err.to_string().contains("send_async"));
    }

    #[test]
    fn test_with_options_keeps_transport_settings() {
        let options = TransportOptions::default()
            .with_http_proxy("http://proxy.internal:3128")
            .with_timeout_secs(5)
            .with_verify_tls(false);
        let card = ConnectorCard::with_options(HOOK, options.clone()).unwrap();

        assert_eq!(card.options(), &options);
        assert_eq!(card.proxies.len(), 1);
    }

    #[test]
    fn test_to_json_is_compact_and_ordered() {
        let mut card = ConnectorCard::new(HOOK).unwrap();
        card.text("hi");
        assert_eq!(
            card.to_json().unwrap(),
            r#"{"@type":"MessageCard","@context":"https://schema.org/extensions","text":"hi"}"#
        );
        assert!(card.to_json_pretty().unwrap().contains("\n  \"text\": \"hi\""));
    }
}
