use serde::Deserialize;
use url::Url;

/// Configuration for a single client-facing model key
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Provider protocol type
    ///
    /// When absent the kind is inferred from the endpoint host. Google
    /// endpoints must be flagged explicitly.
    #[serde(default, rename = "type")]
    pub provider_type: Option<ProviderType>,
    /// Full URL the outbound request is posted to
    pub endpoint: Url,
    /// Alternate URL used when the client asks for a streamed response
    #[serde(default)]
    pub stream_endpoint: Option<Url>,
    /// Model name the upstream provider expects
    pub model: String,
    /// Name of the secret holding the provider credential
    pub api_key_env: String,
    /// `anthropic-version` header override
    #[serde(default)]
    pub anthropic_version: Option<String>,
    /// Generation parameters applied when the request omits them
    #[serde(default)]
    pub defaults: DefaultParameters,
}

/// Supported provider protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// OpenAI-compatible chat completions API
    Openai,
    /// Anthropic Messages API
    Anthropic,
    /// Google Generative Language API
    Google,
}

/// Optional generation parameters used as fallbacks
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultParameters {
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f64>,
}
