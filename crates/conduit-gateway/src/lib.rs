//! Request translation and forwarding engine for Conduit
//!
//! Accepts OpenAI-style chat completion requests, rewrites them into the
//! native shape of the configured upstream provider (OpenAI-compatible,
//! Anthropic, or Google Gemini), executes the call, and relays the upstream
//! response back to the client without reshaping it.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod dialect;
pub mod error;
pub mod handler;
pub mod invoke;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod secrets;
pub mod state;
pub mod translate;
pub mod types;

pub use dialect::Dialect;
pub use error::GatewayError;
pub use handler::gateway_router;
pub use invoke::{UpstreamBody, UpstreamInvoker, UpstreamResponse};
pub use registry::{ProviderEntry, ProviderKind, ProviderRegistry};
pub use secrets::{EnvSecretStore, MapSecretStore, SecretStore};
pub use state::GatewayState;
pub use translate::{OutboundCall, RequestTranslator};
pub use types::{ChatMessage, ChatRequest, MessageContent, Role};
