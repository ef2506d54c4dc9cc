use std::net::SocketAddr;

use serde::Deserialize;

use crate::cors::CorsConfig;

/// Inbound HTTP listener settings
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Defaults to `0.0.0.0:3001` when unset
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub health: HealthConfig,
    /// No CORS headers are sent unless this table is present
    #[serde(default)]
    pub cors: Option<CorsConfig>,
}

/// Plain-text liveness route, outside the API surface
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct HealthConfig {
    pub enabled: bool,
    pub path: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/".to_owned(),
        }
    }
}
