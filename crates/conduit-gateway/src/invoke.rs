//! Outbound HTTP execution

use std::fmt;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;
use conduit_config::UpstreamConfig;
use futures_util::{Stream, StreamExt};
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};
use reqwest::Client;

use crate::error::GatewayError;
use crate::translate::OutboundCall;

/// Raw upstream bytes, in arrival order
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, io::Error>> + Send>>;

/// A fully read upstream body, classified for relaying
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamBody {
    /// Well-formed JSON, kept byte for byte
    Json(Bytes),
    /// UTF-8 text that is not JSON
    Text(String),
    /// Anything else
    Opaque(Bytes),
}

impl UpstreamBody {
    pub fn decode(bytes: Bytes) -> Self {
        if serde_json::from_slice::<serde::de::IgnoredAny>(&bytes).is_ok() {
            return Self::Json(bytes);
        }

        match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Self::Text(text),
            Err(_) => Self::Opaque(bytes),
        }
    }
}

/// What the upstream sent back on success
pub enum UpstreamResponse {
    /// Whole body read before relaying
    Buffered { status: StatusCode, body: UpstreamBody },
    /// Body still arriving
    Streaming {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: ByteStream,
    },
}

impl fmt::Debug for UpstreamResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered { status, body } => f
                .debug_struct("Buffered")
                .field("status", status)
                .field("body", body)
                .finish(),
            Self::Streaming {
                status, content_type, ..
            } => f
                .debug_struct("Streaming")
                .field("status", status)
                .field("content_type", content_type)
                .finish_non_exhaustive(),
        }
    }
}

/// Executes outbound calls over a shared connection pool
#[derive(Debug, Clone)]
pub struct UpstreamInvoker {
    client: Client,
    request_timeout: Duration,
}

impl UpstreamInvoker {
    /// Create an invoker with the configured timeouts
    ///
    /// The connect timeout applies to every call. The request timeout only
    /// bounds buffered calls, since a stream may legitimately stay open
    /// for as long as the model keeps generating.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(config: &UpstreamConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout_duration())
            .build()?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout_duration(),
        })
    }

    /// Execute one outbound call
    ///
    /// # Errors
    ///
    /// - `GatewayError::UpstreamHttp` for any non-2xx status, streaming or not
    /// - `GatewayError::UpstreamUnreachable` when no response arrives
    /// - `GatewayError::UpstreamProtocol` when the call cannot be dispatched
    pub async fn invoke(&self, call: OutboundCall) -> Result<UpstreamResponse, GatewayError> {
        let OutboundCall {
            url,
            headers,
            body,
            use_streaming,
        } = call;

        let host = url.host_str().unwrap_or_default().to_owned();
        let mut builder = self.client.post(url).headers(headers).json(&body);

        if !use_streaming {
            builder = builder.timeout(self.request_timeout);
        }

        let response = builder.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!(upstream = %host, error = %e, "upstream request failed");
            send_error(e)
        })?;

        let status = response.status();

        if !status.is_success() {
            let body = read_body(response).await?;
            tracing::warn!(upstream = %host, status = %status, "upstream returned error");
            return Err(GatewayError::UpstreamHttp { status, body });
        }

        if use_streaming {
            let content_type = response.headers().get(CONTENT_TYPE).cloned();
            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| io::Error::other(e.without_url())));

            tracing::debug!(upstream = %host, status = %status, "upstream stream opened");

            return Ok(UpstreamResponse::Streaming {
                status,
                content_type,
                body: Box::pin(body),
            });
        }

        let body = read_body(response).await?;
        tracing::debug!(upstream = %host, status = %status, "upstream responded");

        Ok(UpstreamResponse::Buffered { status, body })
    }
}

async fn read_body(response: reqwest::Response) -> Result<UpstreamBody, GatewayError> {
    let bytes = response.bytes().await.map_err(|e| {
        let e = e.without_url();
        tracing::error!(error = %e, "failed to read upstream body");
        send_error(e)
    })?;

    Ok(UpstreamBody::decode(bytes))
}

/// Classify a transport failure
///
/// Callers strip the URL first since it may carry a credential.
fn send_error(error: reqwest::Error) -> GatewayError {
    if error.is_builder() {
        GatewayError::UpstreamProtocol(error.to_string())
    } else {
        GatewayError::UpstreamUnreachable(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_is_kept_verbatim() {
        let raw = Bytes::from_static(br#"{"z": 1,  "a": [true]}"#);
        assert_eq!(UpstreamBody::decode(raw.clone()), UpstreamBody::Json(raw));
    }

    #[test]
    fn plain_text_body() {
        let body = UpstreamBody::decode(Bytes::from_static(b"Bad Gateway"));
        assert_eq!(body, UpstreamBody::Text("Bad Gateway".to_owned()));
    }

    #[test]
    fn binary_body_is_opaque() {
        let raw = Bytes::from_static(&[0xff, 0xfe, 0x00]);
        assert_eq!(UpstreamBody::decode(raw.clone()), UpstreamBody::Opaque(raw));
    }

    #[test]
    fn builds_with_default_timeouts() {
        let invoker = UpstreamInvoker::new(&UpstreamConfig::default()).unwrap();
        assert_eq!(invoker.request_timeout, Duration::from_secs(120));
    }
}
