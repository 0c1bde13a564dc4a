use serde::Deserialize;
use serde_json::Value;

use crate::wire::DecodeError;

/// The `{"data": ..., "error": ..., "errors": [...]}` wrapper around every
/// API response.
///
/// Decoded once per response. Precedence is `errors` over `error` over
/// `data`: when either error field carries a message, `data` is never looked
/// at, so a partially populated payload cannot leak into an entity.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorField>,
    #[serde(default)]
    pub errors: Option<ErrorField>,
}

/// An `error` / `errors` field, which the API sends as a string, a list of
/// strings, or occasionally a list of `{"error": "..."}` objects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ErrorField {
    Message(String),
    Messages(Vec<Value>),
    Other(Value),
}

impl ErrorField {
    /// Joins the messages with newlines; `None` when there is nothing to report.
    pub fn message(&self) -> Option<String> {
        let message = match self {
            ErrorField::Message(message) => message.clone(),
            ErrorField::Messages(messages) => messages
                .iter()
                .filter_map(value_message)
                .collect::<Vec<_>>()
                .join("\n"),
            ErrorField::Other(value) => value_message(value).unwrap_or_default(),
        };
        (!message.is_empty()).then_some(message)
    }
}

fn value_message(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => ["error", "message"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_owned)
            .or_else(|| Some(value.to_string())),
        other => Some(other.to_string()),
    }
}

impl Envelope {
    /// Parses a raw response body.
    ///
    /// An empty body is reported as [`DecodeError::MissingData`], anything
    /// that isn't a JSON object as [`DecodeError::InvalidJson`] or
    /// [`DecodeError::Shape`].
    pub fn parse(body: &[u8]) -> Result<Self, DecodeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::MissingData);
        }
        let value: Value = serde_json::from_slice(body).map_err(DecodeError::InvalidJson)?;
        if !value.is_object() {
            return Err(DecodeError::Shape {
                entity: "envelope",
                reason: "response body is not a JSON object".to_string(),
            });
        }
        serde_json::from_value(value).map_err(|source| DecodeError::Field {
            entity: "envelope",
            source,
        })
    }

    /// The error message carried by the envelope, if any.
    pub fn error_message(&self) -> Option<String> {
        self.errors
            .as_ref()
            .and_then(ErrorField::message)
            .or_else(|| self.error.as_ref().and_then(ErrorField::message))
    }

    /// The `data` member; absent or `null` data is [`DecodeError::MissingData`].
    pub fn into_data(self) -> Result<Value, DecodeError> {
        match self.data {
            None | Some(Value::Null) => Err(DecodeError::MissingData),
            Some(data) => Ok(data),
        }
    }
}
