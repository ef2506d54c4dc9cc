use axum::Json;
use axum::response::{IntoResponse, Response};
use conduit_core::HttpError;
use http::StatusCode;
use thiserror::Error;

use crate::invoke::UpstreamBody;

/// Errors that can occur while forwarding a chat completion
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Client body is not a usable chat completion request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Client `model` does not name a configured model key
    #[error("model not found: {model}")]
    UnknownModel { model: String },

    /// The provider credential is missing or still a placeholder
    #[error("no usable credential in `{name}`")]
    UnresolvedCredential { name: String },

    /// Upstream answered with a non-2xx status
    #[error("upstream returned {status}")]
    UpstreamHttp { status: StatusCode, body: UpstreamBody },

    /// No response was received from upstream
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// The outbound call could not be dispatched
    #[error("upstream request could not be built: {0}")]
    UpstreamProtocol(String),
}

impl HttpError for GatewayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UnknownModel { .. } => StatusCode::BAD_REQUEST,
            Self::UnresolvedCredential { .. } | Self::UpstreamProtocol(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamHttp { status, .. } => *status,
            Self::UpstreamUnreachable(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::InvalidRequest(_) | Self::UnknownModel { .. } | Self::UpstreamHttp { .. } => self.to_string(),
            Self::UnresolvedCredential { .. } => "Server configuration error: API key is not configured".to_owned(),
            Self::UpstreamUnreachable(_) => "Gateway Timeout: no response from upstream server".to_owned(),
            Self::UpstreamProtocol(_) => "Internal Server Error: failed to process request".to_owned(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            // Provider errors are surfaced as-is
            Self::UpstreamHttp { status, body } => crate::relay::relay_buffered(status, body),
            other => {
                let body = serde_json::json!({ "error": other.client_message() });
                (status, Json(body)).into_response()
            }
        }
    }
}
