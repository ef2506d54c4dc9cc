use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Conduit LLM gateway
#[derive(Debug, Parser)]
#[command(name = "conduit", about = "OpenAI-compatible gateway for OpenAI, Anthropic, and Gemini providers")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "conduit.toml", env = "CONDUIT_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "CONDUIT_LISTEN")]
    pub listen: Option<SocketAddr>,
}
