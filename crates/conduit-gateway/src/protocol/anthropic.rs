//! Anthropic Messages API wire format types

use serde::Serialize;
use serde_json::Value;

use crate::types::ChatMessage;

/// Anthropic messages API request
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest<'a> {
    /// Upstream model identifier
    pub model: &'a str,
    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<Value>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Value>,
    /// Conversation messages, as sent by the client
    pub messages: &'a [ChatMessage],
    /// Whether to stream the response
    pub stream: bool,
    /// System prompt (top-level, not in messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<&'a Value>,
}
