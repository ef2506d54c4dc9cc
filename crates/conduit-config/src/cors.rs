use std::time::Duration;

use serde::Deserialize;

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins (wildcard "*" or explicit list)
    #[serde(default)]
    pub origins: AnyOrArray,
    /// Allowed HTTP methods
    #[serde(default = "default_methods")]
    pub methods: AnyOrArray,
    /// Allowed request headers
    #[serde(default = "default_headers")]
    pub headers: AnyOrArray,
    /// Max age for preflight cache in seconds
    #[serde(default)]
    pub max_age: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: AnyOrArray::Any,
            methods: default_methods(),
            headers: default_headers(),
            max_age: None,
        }
    }
}

impl CorsConfig {
    /// Get max age as Duration
    pub fn max_age_duration(&self) -> Option<Duration> {
        self.max_age.map(Duration::from_secs)
    }
}

/// Either a wildcard "*" or explicit list of values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AnyOrArray {
    /// Match any value
    #[default]
    Any,
    /// Explicit list
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for AnyOrArray {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            One(String),
            Many(Vec<String>),
        }

        // A single string may carry a comma-separated list, as produced by
        // `{{ env.ALLOWED_ORIGINS }}` expansion
        let values: Vec<String> = match Raw::deserialize(deserializer)? {
            Raw::One(value) => value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
                .collect(),
            Raw::Many(values) => values,
        };

        if values.is_empty() || values.iter().any(|v| v == "*") {
            Ok(AnyOrArray::Any)
        } else {
            Ok(AnyOrArray::List(values))
        }
    }
}

fn default_methods() -> AnyOrArray {
    AnyOrArray::List(
        ["GET", "POST", "PUT", "DELETE", "OPTIONS"]
            .into_iter()
            .map(str::to_owned)
            .collect(),
    )
}

fn default_headers() -> AnyOrArray {
    AnyOrArray::List(vec!["content-type".to_owned(), "authorization".to_owned()])
}
