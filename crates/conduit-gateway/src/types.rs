//! Client-facing chat completion request
//!
//! Mirrors the OpenAI chat completions body. The body is kept exactly as
//! received for OpenAI-compatible upstreams; the typed fields are a
//! lenient view used by the dialects that rebuild the body.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Incoming `POST /v1/chat/completions` body
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatRequest {
    /// Client-facing model key
    pub model: String,
    /// Conversation so far, in order
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub stream: Option<bool>,
    /// Forwarded as sent, without range or type checks
    #[serde(default)]
    pub temperature: Option<Value>,
    /// Forwarded as sent, without range or type checks
    #[serde(default)]
    pub max_tokens: Option<Value>,
    /// Standalone system prompt for providers that keep it outside `messages`
    #[serde(default)]
    pub system: Option<Value>,
    #[serde(skip)]
    raw: Map<String, Value>,
}

impl ChatRequest {
    /// Parse a request body
    pub fn from_slice(body: &[u8]) -> Result<Self, GatewayError> {
        let value: Value = serde_json::from_slice(body).map_err(invalid)?;
        Self::from_value(value)
    }

    /// Build a request from an already parsed JSON value
    pub fn from_value(value: Value) -> Result<Self, GatewayError> {
        let Value::Object(raw) = value else {
            return Err(GatewayError::InvalidRequest("body must be a JSON object".to_owned()));
        };

        let mut request: Self = serde_json::from_value(Value::Object(raw.clone())).map_err(invalid)?;
        request.raw = raw;
        Ok(request)
    }

    /// Top-level fields exactly as the client sent them
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    /// Whether the client asked for a streamed response
    pub fn is_stream(&self) -> bool {
        self.stream.unwrap_or(false)
    }
}

fn invalid(error: serde_json::Error) -> GatewayError {
    GatewayError::InvalidRequest(error.to_string())
}

/// A single conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatMessage {
    /// Build a plain text message
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(content.into())),
            extra: Map::new(),
        }
    }

    /// Flatten the content into plain text
    pub fn text_content(&self) -> String {
        self.content.as_ref().map(MessageContent::as_text).unwrap_or_default()
    }
}

/// Conversation role
///
/// Roles the gateway does not interpret (`tool`, `developer`, ...) are
/// carried through under their original name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        match name.as_str() {
            "system" => Self::System,
            "user" => Self::User,
            "assistant" => Self::Assistant,
            _ => Self::Other(name),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_owned(),
        }
    }
}

/// Message content: a plain string or an array of typed parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<Value>),
}

impl MessageContent {
    /// Plain text view; text parts are joined with newlines, other parts are skipped
    pub fn as_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}
