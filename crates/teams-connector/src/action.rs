//! Actionable elements of a card: input forms, HTTP actions, and open-URI links.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, TeamsError};
use crate::payload::{self, Payload};

/// Action type used unless another is given.
pub const ACTION_CARD: &str = "ActionCard";
/// Action type written by [`PotentialAction::add_open_uri`].
pub const OPEN_URI: &str = "OpenUri";

/// One option of a multichoice input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub display: String,
    pub value: String,
}

impl Choice {
    #[must_use]
    pub fn new(display: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            display: display.into(),
            value: value.into(),
        }
    }

    fn to_value(&self) -> Value {
        json!({ "display": self.display, "value": self.value })
    }
}

/// Builder for one `potentialAction` entry of a connector card.
///
/// An action is either an `ActionCard` (with inputs and/or sub-actions) or an
/// `OpenUri` link-out. Converting an `ActionCard` with [`add_open_uri`] keeps
/// any `inputs`/`actions` already added.
///
/// [`add_open_uri`]: PotentialAction::add_open_uri
#[derive(Debug, Clone, PartialEq)]
pub struct PotentialAction {
    payload: Payload,
    choices: Vec<Choice>,
}

impl PotentialAction {
    /// Create an `ActionCard` action.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_type(name, ACTION_CARD)
    }

    #[must_use]
    pub fn with_type(name: impl Into<String>, kind: impl Into<String>) -> Self {
        let mut payload = Payload::new();
        payload.insert("@type".to_string(), Value::String(kind.into()));
        payload.insert("name".to_string(), Value::String(name.into()));
        Self {
            payload,
            choices: Vec::new(),
        }
    }

    /// Create an `OpenUri` action in one step.
    ///
    /// # Errors
    ///
    /// Same as [`add_open_uri`](Self::add_open_uri).
    pub fn open_uri(name: impl Into<String>, targets: Value) -> Result<Self> {
        let name = name.into();
        let mut action = Self::new(name.clone());
        action.add_open_uri(name, targets)?;
        Ok(action)
    }

    /// Append an input field.
    ///
    /// The input captures the choices added so far; later `add_choice` calls
    /// do not reach it.
    pub fn add_input(
        &mut self,
        kind: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        is_multiline: Option<bool>,
    ) -> &mut Self {
        let mut input = Payload::new();
        input.insert("@type".to_string(), Value::String(kind.into()));
        input.insert("id".to_string(), Value::String(id.into()));
        input.insert("title".to_string(), Value::String(title.into()));
        if let Some(multiline) = is_multiline {
            input.insert("isMultiline".to_string(), Value::Bool(multiline));
        }
        if !self.choices.is_empty() {
            let choices = self.choices.iter().map(Choice::to_value).collect();
            input.insert("choices".to_string(), Value::Array(choices));
        }

        payload::append(&mut self.payload, "inputs", Value::Object(input));
        self
    }

    /// Append a sub-action such as `HttpPOST`.
    pub fn add_action(
        &mut self,
        kind: impl Into<String>,
        name: impl Into<String>,
        target: impl Into<String>,
        body: Option<&str>,
    ) -> &mut Self {
        let mut action = Payload::new();
        action.insert("@type".to_string(), Value::String(kind.into()));
        action.insert("name".to_string(), Value::String(name.into()));
        action.insert("target".to_string(), Value::String(target.into()));
        if let Some(body) = body {
            action.insert("body".to_string(), Value::String(body.to_string()));
        }

        payload::append(&mut self.payload, "actions", Value::Object(action));
        self
    }

    /// Turn this action into an `OpenUri` link-out.
    ///
    /// `targets` must be an array of objects with string values, for example
    /// `[{"os": "default", "uri": "https://..."}]`.
    ///
    /// # Errors
    ///
    /// Returns [`TeamsError::InvalidArgument`] if `targets` has any other
    /// shape. The action is left unchanged in that case.
    pub fn add_open_uri(&mut self, name: impl Into<String>, targets: Value) -> Result<&mut Self> {
        validate_targets(&targets)?;

        self.payload
            .insert("@type".to_string(), Value::String(OPEN_URI.to_string()));
        self.payload
            .insert("name".to_string(), Value::String(name.into()));
        self.payload.insert("targets".to_string(), targets);
        Ok(self)
    }

    /// Record a choice for inputs added after this call.
    pub fn add_choice(&mut self, display: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.choices.push(Choice::new(display, value));
        self
    }

    /// Choices recorded so far.
    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// The fields accumulated so far.
    #[must_use]
    pub const fn dump(&self) -> &Payload {
        &self.payload
    }

    pub(crate) fn into_value(self) -> Value {
        Value::Object(self.payload)
    }
}

fn validate_targets(targets: &Value) -> Result<()> {
    let well_formed = targets.as_array().is_some_and(|items| {
        items.iter().all(|item| {
            item.as_object()
                .is_some_and(|target| target.values().all(Value::is_string))
        })
    });

    if well_formed {
        Ok(())
    } else {
        Err(TeamsError::invalid(
            "open URI targets must be a list of string-to-string mappings",
        ))
    }
}
