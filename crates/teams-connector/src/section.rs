//! Card sections: the title/text/facts/images blocks inside a card.

use serde_json::{json, Value};

use crate::payload::{self, Payload};

/// Builder for one `sections` entry of a connector card.
///
/// Scalar setters overwrite their key; `add_fact` and `add_image` append in
/// call order. The section is consumed when attached with
/// [`ConnectorCard::add_section`](crate::ConnectorCard::add_section).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardSection {
    payload: Payload,
}

impl CardSection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&mut self, title: impl Into<String>) -> &mut Self {
        self.set("title", title)
    }

    pub fn activity_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.set("activityTitle", title)
    }

    pub fn activity_subtitle(&mut self, subtitle: impl Into<String>) -> &mut Self {
        self.set("activitySubtitle", subtitle)
    }

    /// Set the avatar image shown next to the activity title.
    pub fn activity_image(&mut self, url: impl Into<String>) -> &mut Self {
        self.set("activityImage", url)
    }

    pub fn activity_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set("activityText", text)
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.set("text", text)
    }

    /// Append a name/value row to the section's fact table.
    pub fn add_fact(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        payload::append(
            &mut self.payload,
            "facts",
            json!({ "name": name.into(), "value": value.into() }),
        );
        self
    }

    /// Append several facts, preserving iteration order.
    pub fn add_facts<N, V>(&mut self, facts: impl IntoIterator<Item = (N, V)>) -> &mut Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        for (name, value) in facts {
            self.add_fact(name, value);
        }
        self
    }

    pub fn add_image(&mut self, url: impl Into<String>, title: Option<&str>) -> &mut Self {
        let mut image = Payload::new();
        image.insert("image".to_string(), Value::String(url.into()));
        if let Some(title) = title {
            image.insert("title".to_string(), Value::String(title.to_string()));
        }
        payload::append(&mut self.payload, "images", Value::Object(image));
        self
    }

    /// Attach a button opening `url`.
    ///
    /// A section holds a single link button; calling this again replaces it.
    pub fn link_button(&mut self, text: impl Into<String>, url: impl Into<String>) -> &mut Self {
        self.payload.insert(
            "potentialAction".to_string(),
            Value::Array(vec![payload::view_action(text, url)]),
        );
        self
    }

    pub fn disable_markdown(&mut self) -> &mut Self {
        self.payload.insert("markdown".to_string(), Value::Bool(false));
        self
    }

    pub fn enable_markdown(&mut self) -> &mut Self {
        self.payload.insert("markdown".to_string(), Value::Bool(true));
        self
    }

    /// The fields accumulated so far.
    #[must_use]
    pub const fn dump(&self) -> &Payload {
        &self.payload
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Object(self.payload)
    }

    fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.payload
            .insert(key.to_string(), Value::String(value.into()));
        self
    }
}
