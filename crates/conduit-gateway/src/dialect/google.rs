//! Google Generative Language API translation

use http::HeaderMap;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use super::{Dialect, max_tokens, temperature, to_body};
use crate::error::GatewayError;
use crate::protocol::google::{
    GoogleContent, GoogleGenerationConfig, GooglePart, GoogleRequest, GoogleSystemInstruction,
};
use crate::registry::ProviderEntry;
use crate::types::{ChatMessage, ChatRequest, Role};

/// Query-key authenticated dialect producing `generateContent` bodies
pub struct GeminiDialect;

impl Dialect for GeminiDialect {
    fn name(&self) -> &'static str {
        "google"
    }

    fn authorize(
        &self,
        _entry: &ProviderEntry,
        credential: &SecretString,
        url: &mut Url,
        _headers: &mut HeaderMap,
    ) -> Result<(), GatewayError> {
        url.query_pairs_mut().append_pair("key", credential.expose_secret());
        Ok(())
    }

    fn body(&self, request: &ChatRequest, entry: &ProviderEntry) -> Result<Value, GatewayError> {
        let wire = GoogleRequest {
            contents: request.messages.iter().map(content).collect(),
            generation_config: GoogleGenerationConfig {
                temperature: temperature(request, entry),
                max_output_tokens: max_tokens(request, entry),
            },
            system_instruction: request.system.as_ref().and_then(system_instruction),
        };

        to_body(&wire)
    }
}

/// Gemini has no system role; system turns are sent as user turns
fn content(message: &ChatMessage) -> GoogleContent {
    let role = match message.role {
        Role::System => "user",
        ref other => other.as_str(),
    };

    GoogleContent {
        role: role.to_owned(),
        parts: vec![GooglePart {
            text: message.text_content(),
        }],
    }
}

fn system_instruction(system: &Value) -> Option<GoogleSystemInstruction> {
    let parts: Vec<GooglePart> = match system {
        Value::String(text) => vec![GooglePart { text: text.clone() }],
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|block| block.get("text").and_then(Value::as_str))
            .map(|text| GooglePart { text: text.to_owned() })
            .collect(),
        _ => Vec::new(),
    };

    (!parts.is_empty()).then_some(GoogleSystemInstruction { parts })
}
