//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use conduit_config::{
    Config, DefaultParameters, HealthConfig, ModelConfig, ProviderType, ServerConfig, UpstreamConfig,
};
use indexmap::IndexMap;

/// Secret name every model built here reads its credential from
pub const API_KEY_ENV: &str = "TEST_API_KEY";

/// Credential value the test server is started with
pub const API_KEY: &str = "test-secret";

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                    cors: None,
                },
                upstream: UpstreamConfig::default(),
                models: IndexMap::new(),
                telemetry: None,
            },
        }
    }

    /// Add a model entry
    pub fn with_model(mut self, key: &str, model: ModelConfig) -> Self {
        self.config.models.insert(key.to_owned(), model);
        self
    }

    /// Add an OpenAI-compatible model pointed at `endpoint`
    pub fn with_openai_model(self, key: &str, endpoint: &str) -> Self {
        self.with_model(key, model(endpoint, None))
    }

    /// Add an Anthropic model pointed at `endpoint`
    ///
    /// The type is explicit since mock upstreams are not on Anthropic's domain.
    pub fn with_anthropic_model(self, key: &str, endpoint: &str) -> Self {
        self.with_model(key, model(endpoint, Some(ProviderType::Anthropic)))
    }

    /// Add a Gemini model with separate buffered and streaming endpoints
    pub fn with_gemini_model(self, key: &str, endpoint: &str, stream_endpoint: &str) -> Self {
        let mut gemini = model(endpoint, Some(ProviderType::Google));
        gemini.stream_endpoint = Some(stream_endpoint.parse().expect("valid URL"));
        self.with_model(key, gemini)
    }

    /// Set the buffered request timeout in seconds
    pub fn with_request_timeout(mut self, seconds: u64) -> Self {
        self.config.upstream.request_timeout = seconds;
        self
    }

    /// Move the liveness route
    pub fn with_health_path(mut self, path: &str) -> Self {
        self.config.server.health.path = path.to_owned();
        self
    }

    /// Disable the liveness route
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}

/// Model entry with the shared test credential and fixed defaults
pub fn model(endpoint: &str, provider_type: Option<ProviderType>) -> ModelConfig {
    ModelConfig {
        provider_type,
        endpoint: endpoint.parse().expect("valid URL"),
        stream_endpoint: None,
        model: "upstream-model".to_owned(),
        api_key_env: API_KEY_ENV.to_owned(),
        anthropic_version: None,
        defaults: DefaultParameters {
            max_tokens: Some(256),
            temperature: Some(0.5),
        },
    }
}
