#![allow(clippy::must_use_candidate)]

pub mod cors;
mod env;
mod loader;
pub mod models;
pub mod server;
pub mod telemetry;
pub mod upstream;

use indexmap::IndexMap;
use serde::Deserialize;

pub use cors::*;
pub use models::*;
pub use server::*;
pub use telemetry::{LogFormat, TelemetryConfig};
pub use upstream::*;

/// Top-level Conduit configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upstream transport settings shared by every provider
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// Client-facing model keys mapped to provider connection details
    #[serde(default)]
    pub models: IndexMap<String, ModelConfig>,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
