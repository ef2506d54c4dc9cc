//! Google Generative Language API wire format types

use serde::Serialize;
use serde_json::Value;

/// Google `generateContent` request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleRequest {
    /// Conversation contents
    pub contents: Vec<GoogleContent>,
    /// Generation configuration
    pub generation_config: GoogleGenerationConfig,
    /// System instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GoogleSystemInstruction>,
}

/// A content entry (message) in a Google request
#[derive(Debug, Clone, Serialize)]
pub struct GoogleContent {
    /// Role ("user" or the client's original role)
    pub role: String,
    /// Content parts
    pub parts: Vec<GooglePart>,
}

/// A text part
#[derive(Debug, Clone, Serialize)]
pub struct GooglePart {
    pub text: String,
}

/// System instruction (no role, parts only)
#[derive(Debug, Clone, Serialize)]
pub struct GoogleSystemInstruction {
    pub parts: Vec<GooglePart>,
}

/// Generation configuration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleGenerationConfig {
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Value>,
    /// Maximum output tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<Value>,
}
