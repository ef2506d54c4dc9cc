//! OpenAI-compatible translation
//!
//! The client already speaks this format, so the body is passed through
//! with only `model` swapped for the upstream name.

use http::HeaderMap;
use http::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use url::Url;

use super::{Dialect, sensitive_header};
use crate::error::GatewayError;
use crate::registry::ProviderEntry;
use crate::types::ChatRequest;

/// Bearer-token, pass-through dialect
pub struct OpenAiDialect;

impl Dialect for OpenAiDialect {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn authorize(
        &self,
        _entry: &ProviderEntry,
        credential: &SecretString,
        _url: &mut Url,
        headers: &mut HeaderMap,
    ) -> Result<(), GatewayError> {
        let bearer = sensitive_header(&format!("Bearer {}", credential.expose_secret()))?;
        headers.insert(AUTHORIZATION, bearer);
        Ok(())
    }

    fn body(&self, request: &ChatRequest, entry: &ProviderEntry) -> Result<Value, GatewayError> {
        let mut body = request.raw().clone();
        body.insert("model".to_owned(), Value::String(entry.model.clone()));
        Ok(Value::Object(body))
    }
}
