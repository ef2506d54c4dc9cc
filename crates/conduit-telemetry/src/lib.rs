//! Logging for Conduit
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a
//! text or JSON `fmt` layer.

use conduit_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `RUST_LOG` nor the configuration provide one
const DEFAULT_FILTER: &str = "info";

/// Initialize logging from configuration
///
/// `RUST_LOG` wins over the configured `log_filter`. An unparseable filter
/// falls back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>) -> anyhow::Result<()> {
    let configured = config.map_or(DEFAULT_FILTER, |c| c.log_filter.as_str());
    let filter = build_filter(configured);
    let format = config.map(|c| c.format).unwrap_or_default();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt_layer).try_init()?,
        LogFormat::Json => registry.with(fmt_layer.json().flatten_event(true)).try_init()?,
    }

    Ok(())
}

fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
