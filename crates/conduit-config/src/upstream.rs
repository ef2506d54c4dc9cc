use std::time::Duration;

use serde::Deserialize;

/// Outbound HTTP transport settings
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,
    /// Total timeout in seconds for buffered calls
    ///
    /// Streaming calls are only bounded by the connect timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl UpstreamConfig {
    pub const fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub const fn request_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

const fn default_connect_timeout() -> u64 {
    10
}

const fn default_request_timeout() -> u64 {
    120
}
