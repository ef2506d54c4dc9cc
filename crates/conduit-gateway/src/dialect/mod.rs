//! Per-provider request translation strategies

pub mod anthropic;
pub mod google;
pub mod openai;

use http::HeaderMap;
use http::header::HeaderValue;
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Number, Value};
use url::Url;

use crate::error::GatewayError;
use crate::registry::ProviderEntry;
use crate::types::ChatRequest;

/// Translation strategy for one provider kind
///
/// Implementations are stateless and pure: the same request and entry
/// always produce the same URL, headers, and body.
pub trait Dialect: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Attach the credential to the outbound URL or headers
    fn authorize(
        &self,
        entry: &ProviderEntry,
        credential: &SecretString,
        url: &mut Url,
        headers: &mut HeaderMap,
    ) -> Result<(), GatewayError>;

    /// Build the provider-native request body
    fn body(&self, request: &ChatRequest, entry: &ProviderEntry) -> Result<Value, GatewayError>;
}

/// Header value that is redacted from `Debug` output
fn sensitive_header(value: &str) -> Result<HeaderValue, GatewayError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| GatewayError::UpstreamProtocol("credential is not a valid header value".to_owned()))?;
    header.set_sensitive(true);
    Ok(header)
}

/// Requested `max_tokens`, falling back to the model default
fn max_tokens(request: &ChatRequest, entry: &ProviderEntry) -> Option<Value> {
    request
        .max_tokens
        .clone()
        .or_else(|| entry.defaults.max_tokens.map(Value::from))
}

/// Requested `temperature`, falling back to the model default
fn temperature(request: &ChatRequest, entry: &ProviderEntry) -> Option<Value> {
    request
        .temperature
        .clone()
        .or_else(|| entry.defaults.temperature.and_then(Number::from_f64).map(Value::Number))
}

fn to_body<T: Serialize>(wire: &T) -> Result<Value, GatewayError> {
    serde_json::to_value(wire).map_err(|e| GatewayError::UpstreamProtocol(format!("failed to encode body: {e}")))
}
