//! Test server wrapper that starts Conduit on a random port

use std::net::SocketAddr;
use std::sync::Arc;

use conduit_config::Config;
use conduit_gateway::MapSecretStore;
use conduit_server::Server;
use tokio_util::sync::CancellationToken;

use super::config::{API_KEY, API_KEY_ENV};

/// A running test server instance
pub struct TestServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestServer {
    /// Start a test server whose credential store holds the shared test key
    pub async fn start(config: Config) -> anyhow::Result<Self> {
        Self::start_with_secrets(config, MapSecretStore::new().with(API_KEY_ENV, API_KEY)).await
    }

    /// Start a test server with the given credentials
    ///
    /// Binds to port 0 for automatic port assignment
    pub async fn start_with_secrets(config: Config, secrets: MapSecretStore) -> anyhow::Result<Self> {
        let server = Server::with_secrets(config, Arc::new(secrets))?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        // Bind the listener here so we know the actual port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            axum::serve(listener, server.into_router())
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        let client = reqwest::Client::new();

        Ok(Self { addr, shutdown, client })
    }

    /// URL of `path` on the running test server
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Get a reference to the HTTP client
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST a chat completion body
    pub async fn chat(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(self.url("/v1/chat/completions"))
            .json(body)
            .send()
            .await
            .expect("request reaches the test server")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
