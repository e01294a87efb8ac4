//! Microsoft Teams connector cards.
//!
//! This crate builds MessageCard documents and posts them to a Teams
//! incoming webhook.
//!
//! # Usage
//!
//! ```no_run
//! use serde_json::json;
//! use teams_connector::{format_url, CardSection, ConnectorCard, PotentialAction};
//!
//! # async fn run() -> teams_connector::Result<()> {
//! let mut section = CardSection::new();
//! section
//!     .activity_title("Play Started: Task #42")
//!     .activity_subtitle("5dlabs/example")
//!     .add_fact("Workflow", "play-42-abc123")
//!     .text(format_url("Open workflow", "https://argo.example.com/play-42"));
//!
//! let mut action = PotentialAction::new("Comment");
//! action
//!     .add_input("TextInput", "comment", "Add a comment", Some(true))
//!     .add_action("HttpPOST", "Save", "https://example.com/comment", None);
//!
//! let mut card = ConnectorCard::from_env()?;
//! card.summary("Play started")
//!     .color("red")
//!     .add_section(section)
//!     .add_potential_action(action)
//!     .add_potential_action(PotentialAction::open_uri(
//!         "View repository",
//!         json!([{"os": "default", "uri": "https://github.com/5dlabs/example"}]),
//!     )?);
//!
//! let delivery = card.send_async().await??;
//! assert!(delivery.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`ConnectorCard::from_env`] reads `TEAMS_WEBHOOK_URL` plus the optional
//! transport variables documented in [`config`].
//!
//! # Delivery
//!
//! [`ConnectorCard::send`] blocks until the webhook answers;
//! [`ConnectorCard::send_async`] runs the same request on a Tokio task. Each
//! call makes exactly one request and returns a [`Delivery`] or a
//! [`TeamsError`]. Nothing is retried.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod card;
pub mod config;
pub mod error;
pub mod payload;
pub mod section;
pub mod transport;

pub use action::{Choice, PotentialAction};
pub use card::ConnectorCard;
pub use config::TransportOptions;
pub use error::{Result, TeamsError};
pub use payload::Payload;
pub use section::CardSection;
pub use transport::Delivery;

/// Format a markdown link: `[display](url)`.
#[must_use]
pub fn format_url(display: &str, url: &str) -> String {
    format!("[{display}]({url})")
}
