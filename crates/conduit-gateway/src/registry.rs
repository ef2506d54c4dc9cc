//! Model key to provider mapping, built once at startup

use conduit_config::{DefaultParameters, ModelConfig, ProviderType};
use indexmap::IndexMap;
use thiserror::Error;
use url::Url;

use crate::dialect::{self, Dialect};

/// Default `anthropic-version` header value
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";

/// Upstream protocol family, fixed when the registry is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// OpenAI chat completions and compatible APIs
    OpenAiCompatible,
    /// Anthropic Messages API
    Anthropic,
    /// Google Generative Language API
    Gemini,
}

impl ProviderKind {
    /// Decide the kind for an endpoint
    ///
    /// An explicit type always wins. Otherwise endpoints on Anthropic's
    /// domain are Anthropic and everything else is OpenAI-compatible;
    /// Gemini is never inferred.
    pub fn resolve(explicit: Option<ProviderType>, endpoint: &Url) -> Self {
        match explicit {
            Some(ProviderType::Openai) => Self::OpenAiCompatible,
            Some(ProviderType::Anthropic) => Self::Anthropic,
            Some(ProviderType::Google) => Self::Gemini,
            None if is_anthropic_host(endpoint) => Self::Anthropic,
            None => Self::OpenAiCompatible,
        }
    }

    /// Translation strategy for this kind
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::OpenAiCompatible => &dialect::openai::OpenAiDialect,
            Self::Anthropic => &dialect::anthropic::AnthropicDialect,
            Self::Gemini => &dialect::google::GeminiDialect,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "google",
        }
    }
}

fn is_anthropic_host(endpoint: &Url) -> bool {
    endpoint
        .host_str()
        .is_some_and(|host| host == "anthropic.com" || host.ends_with(".anthropic.com"))
}

/// Connection metadata for one client-facing model key
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEntry {
    /// Client-facing model key
    pub key: String,
    /// URL buffered calls are posted to
    pub endpoint: Url,
    /// URL streaming calls are posted to, when it differs from `endpoint`
    pub stream_endpoint: Option<Url>,
    /// Model name the upstream expects
    pub model: String,
    /// Name of the secret holding the credential
    pub api_key_env: String,
    pub kind: ProviderKind,
    /// `anthropic-version` override
    pub anthropic_version: Option<String>,
    pub defaults: DefaultParameters,
}

impl ProviderEntry {
    /// Build an entry from its configuration block
    pub fn from_config(key: &str, config: &ModelConfig) -> Self {
        Self {
            key: key.to_owned(),
            endpoint: config.endpoint.clone(),
            stream_endpoint: config.stream_endpoint.clone(),
            model: config.model.clone(),
            api_key_env: config.api_key_env.clone(),
            kind: ProviderKind::resolve(config.provider_type, &config.endpoint),
            anthropic_version: config.anthropic_version.clone(),
            defaults: config.defaults,
        }
    }

    /// URL for a call, depending on whether it streams
    pub fn url_for(&self, streaming: bool) -> &Url {
        match (&self.stream_endpoint, streaming) {
            (Some(stream_endpoint), true) => stream_endpoint,
            _ => &self.endpoint,
        }
    }

    /// `anthropic-version` header value
    pub fn anthropic_version(&self) -> &str {
        self.anthropic_version.as_deref().unwrap_or(DEFAULT_ANTHROPIC_VERSION)
    }
}

/// Errors building a registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same model key was supplied twice
    #[error("duplicate model key: {0}")]
    DuplicateKey(String),
}

/// Immutable lookup table from model key to provider entry
///
/// Keys keep their configuration order, which is also the order of
/// `GET /v1/models`.
#[derive(Debug, Default)]
pub struct ProviderRegistry {
    entries: IndexMap<String, ProviderEntry>,
}

impl ProviderRegistry {
    /// Build a registry from entries, rejecting duplicate keys
    pub fn new(entries: impl IntoIterator<Item = ProviderEntry>) -> Result<Self, RegistryError> {
        let mut map = IndexMap::new();

        for entry in entries {
            if map.contains_key(&entry.key) {
                return Err(RegistryError::DuplicateKey(entry.key));
            }
            map.insert(entry.key.clone(), entry);
        }

        Ok(Self { entries: map })
    }

    /// Build a registry from the `[models]` configuration table
    pub fn from_config(models: &IndexMap<String, ModelConfig>) -> Result<Self, RegistryError> {
        let registry = Self::new(
            models
                .iter()
                .map(|(key, config)| ProviderEntry::from_config(key, config)),
        )?;

        for entry in registry.entries.values() {
            tracing::debug!(
                model = %entry.key,
                kind = entry.kind.as_str(),
                upstream_model = %entry.model,
                "registered model"
            );
        }

        Ok(registry)
    }

    /// Find the entry for a model key
    pub fn lookup(&self, key: &str) -> Option<&ProviderEntry> {
        self.entries.get(key)
    }

    /// Model keys in configuration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
