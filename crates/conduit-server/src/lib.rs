//! HTTP server assembly for Conduit

mod cors;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use conduit_config::Config;
use conduit_gateway::{EnvSecretStore, GatewayState, SecretStore};
use tower_http::trace::TraceLayer;

pub use health::LIVENESS_TEXT;

/// Port used when no listen address is configured
pub const DEFAULT_PORT: u16 = 3001;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the provider registry or the upstream HTTP client
    /// cannot be built
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Self::with_secrets(config, Arc::new(EnvSecretStore))
    }

    /// Build the server with credentials taken from `secrets`
    ///
    /// # Errors
    ///
    /// Returns an error if the provider registry or the upstream HTTP client
    /// cannot be built
    pub fn with_secrets(config: Config, secrets: Arc<dyn SecretStore>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));

        let gateway = GatewayState::with_secrets(&config, secrets)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(conduit_gateway::gateway_router(gateway));

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
