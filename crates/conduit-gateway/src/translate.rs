//! Client request to provider-native outbound call

use std::fmt;
use std::sync::Arc;

use conduit_core::sanitize_forwarded_headers;
use http::HeaderMap;
use serde_json::Value;
use url::Url;

use crate::error::GatewayError;
use crate::registry::ProviderEntry;
use crate::secrets::{SecretStore, resolve_credential};
use crate::types::ChatRequest;

/// Everything needed to execute one upstream call
///
/// Carries the credential inside `url` or `headers`, so `Debug` redacts both.
#[derive(Clone)]
pub struct OutboundCall {
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Value,
    /// Whether the client asked for a streamed response
    pub use_streaming: bool,
}

impl fmt::Debug for OutboundCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut redacted = self.url.clone();
        redacted.set_query(None);

        f.debug_struct("OutboundCall")
            .field("url", &redacted.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("use_streaming", &self.use_streaming)
            .finish_non_exhaustive()
    }
}

/// Builds outbound calls from client requests
///
/// Translation performs no I/O beyond the secret lookup.
#[derive(Clone)]
pub struct RequestTranslator {
    secrets: Arc<dyn SecretStore>,
}

impl RequestTranslator {
    pub fn new(secrets: Arc<dyn SecretStore>) -> Self {
        Self { secrets }
    }

    /// Translate a client request for the provider behind `entry`
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::UnresolvedCredential` when the entry's
    /// credential is missing or a placeholder. No outbound call exists in
    /// that case.
    pub fn translate(
        &self,
        request: &ChatRequest,
        inbound: &HeaderMap,
        entry: &ProviderEntry,
    ) -> Result<OutboundCall, GatewayError> {
        let credential = resolve_credential(self.secrets.as_ref(), &entry.api_key_env)?;
        let use_streaming = request.is_stream();
        let dialect = entry.kind.dialect();

        let mut url = entry.url_for(use_streaming).clone();
        let mut headers = sanitize_forwarded_headers(inbound);

        dialect.authorize(entry, &credential, &mut url, &mut headers)?;
        let body = dialect.body(request, entry)?;

        tracing::debug!(
            model = %entry.key,
            dialect = dialect.name(),
            stream = use_streaming,
            "translated request"
        );

        Ok(OutboundCall {
            url,
            headers,
            body,
            use_streaming,
        })
    }
}
