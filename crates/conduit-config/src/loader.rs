use std::path::Path;

use url::Url;

use crate::{Config, ProviderType};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse and validate configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if no models are configured or a model entry is unusable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.models.is_empty() {
            anyhow::bail!("at least one model must be configured under [models]");
        }

        for (key, model) in &self.models {
            if key.trim().is_empty() {
                anyhow::bail!("model keys must not be empty");
            }

            validate_url(key, "endpoint", &model.endpoint)?;
            if let Some(ref stream_endpoint) = model.stream_endpoint {
                validate_url(key, "stream_endpoint", stream_endpoint)?;
            }

            if model.model.trim().is_empty() {
                anyhow::bail!("model '{key}' must name the upstream model");
            }

            if model.api_key_env.trim().is_empty() {
                anyhow::bail!("model '{key}' must set api_key_env");
            }

            if model.anthropic_version.is_some()
                && model.provider_type.is_some_and(|t| t != ProviderType::Anthropic)
            {
                anyhow::bail!("model '{key}' sets anthropic_version but is not an anthropic provider");
            }
        }

        Ok(())
    }
}

fn validate_url(key: &str, field: &str, url: &Url) -> anyhow::Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("model '{key}' {field} must use http or https, got '{other}'"),
    }
}
