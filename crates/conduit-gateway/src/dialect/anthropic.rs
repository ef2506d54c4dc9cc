//! Anthropic Messages API translation

use http::HeaderMap;
use http::header::{AUTHORIZATION, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use super::{Dialect, max_tokens, sensitive_header, temperature, to_body};
use crate::error::GatewayError;
use crate::protocol::anthropic::AnthropicRequest;
use crate::registry::ProviderEntry;
use crate::types::ChatRequest;

/// `x-api-key` authenticated dialect with a rebuilt body
pub struct AnthropicDialect;

impl Dialect for AnthropicDialect {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn authorize(
        &self,
        entry: &ProviderEntry,
        credential: &SecretString,
        _url: &mut Url,
        headers: &mut HeaderMap,
    ) -> Result<(), GatewayError> {
        let version = HeaderValue::from_str(entry.anthropic_version())
            .map_err(|_| GatewayError::UpstreamProtocol("invalid anthropic-version value".to_owned()))?;

        headers.remove(AUTHORIZATION);
        headers.insert("x-api-key", sensitive_header(credential.expose_secret())?);
        headers.insert("anthropic-version", version);
        Ok(())
    }

    fn body(&self, request: &ChatRequest, entry: &ProviderEntry) -> Result<Value, GatewayError> {
        let wire = AnthropicRequest {
            model: &entry.model,
            max_tokens: max_tokens(request, entry),
            temperature: temperature(request, entry),
            messages: &request.messages,
            stream: request.is_stream(),
            system: request.system.as_ref(),
        };

        to_body(&wire)
    }
}
