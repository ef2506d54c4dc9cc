//! Shared gateway state and per-request orchestration

use std::fmt;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use conduit_config::{Config, UpstreamConfig};
use conduit_core::HttpError;
use http::HeaderMap;

use crate::error::GatewayError;
use crate::invoke::UpstreamInvoker;
use crate::registry::ProviderRegistry;
use crate::relay;
use crate::secrets::{EnvSecretStore, SecretStore};
use crate::translate::RequestTranslator;
use crate::types::ChatRequest;

/// Shared state for gateway route handlers
#[derive(Clone)]
pub struct GatewayState {
    inner: Arc<GatewayStateInner>,
}

struct GatewayStateInner {
    registry: Arc<ProviderRegistry>,
    translator: RequestTranslator,
    invoker: UpstreamInvoker,
}

/// Where a request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Resolving,
    Translating,
    Invoking,
    Relaying,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Resolving => "resolving",
            Self::Translating => "translating",
            Self::Invoking => "invoking",
            Self::Relaying => "relaying",
        };
        f.write_str(name)
    }
}

impl GatewayState {
    /// Create state from an already built registry and secret store
    ///
    /// # Errors
    ///
    /// Returns an error if the outbound HTTP client cannot be built
    pub fn new(
        registry: Arc<ProviderRegistry>,
        secrets: Arc<dyn SecretStore>,
        upstream: &UpstreamConfig,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            inner: Arc::new(GatewayStateInner {
                registry,
                translator: RequestTranslator::new(secrets),
                invoker: UpstreamInvoker::new(upstream)?,
            }),
        })
    }

    /// Create state from configuration, reading credentials from the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the registry or HTTP client cannot be built
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::with_secrets(config, Arc::new(EnvSecretStore))
    }

    /// Create state from configuration with an explicit secret store
    ///
    /// # Errors
    ///
    /// Returns an error if the registry or HTTP client cannot be built
    pub fn with_secrets(config: &Config, secrets: Arc<dyn SecretStore>) -> anyhow::Result<Self> {
        let registry = ProviderRegistry::from_config(&config.models)?;
        tracing::info!(models = registry.len(), "provider registry loaded");

        Self::new(Arc::new(registry), secrets, &config.upstream)
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.inner.registry
    }

    /// Handle one chat completion request from its headers and raw body
    ///
    /// Every failure is turned into a response here; nothing is retried.
    pub async fn handle(&self, headers: &HeaderMap, body: &[u8]) -> Response {
        let mut model = String::new();

        match self.run(headers, body, &mut model).await {
            Ok(response) => {
                tracing::debug!(model = %model, "request done");
                response
            }
            Err((stage, error)) => {
                log_failure(stage, &model, &error);
                error.into_response()
            }
        }
    }

    async fn run(&self, headers: &HeaderMap, body: &[u8], model: &mut String) -> Result<Response, (Stage, GatewayError)> {
        let mut stage = Stage::Resolving;
        let fail = |stage: Stage| move |error: GatewayError| (stage, error);

        let request = ChatRequest::from_slice(body).map_err(fail(stage))?;
        model.clone_from(&request.model);
        tracing::trace!(model = %model, body = %String::from_utf8_lossy(body), "inbound request");

        let entry = self
            .inner
            .registry
            .lookup(&request.model)
            .ok_or_else(|| GatewayError::UnknownModel {
                model: request.model.clone(),
            })
            .map_err(fail(stage))?;

        stage = advance(stage, Stage::Translating, model);
        let call = self
            .inner
            .translator
            .translate(&request, headers, entry)
            .map_err(fail(stage))?;

        stage = advance(stage, Stage::Invoking, model);
        let upstream = self.inner.invoker.invoke(call).await.map_err(fail(stage))?;

        advance(stage, Stage::Relaying, model);
        Ok(relay::relay(upstream, model))
    }
}

fn advance(from: Stage, to: Stage, model: &str) -> Stage {
    tracing::debug!(model = %model, from = %from, to = %to, "request stage");
    to
}

fn log_failure(stage: Stage, model: &str, error: &GatewayError) {
    let status = error.status_code();

    if status.is_server_error() {
        tracing::error!(model = %model, stage = %stage, status = %status, error = %error, "request failed");
    } else {
        tracing::warn!(model = %model, stage = %stage, status = %status, error = %error, "request failed");
    }
}
