// Sahiti - HTTP server module
// Serves the chat endpoint plus provider, health and metrics endpoints

mod handlers;
mod stream;

pub use handlers::{
    create_router, handle_chat, health_check, list_providers, metrics_endpoint, HealthStatus,
    ProviderInfo,
};
pub use stream::{body_stream, encode_error, encode_text};

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::ChatService;
use crate::config::Config;
use crate::metrics::ChatMetrics;
use crate::providers::ProviderFactory;

/// Main chat server structure
pub struct ChatServer {
    /// Request handler (stateless, shared by all requests)
    service: ChatService,
    metrics: ChatMetrics,
    config: Arc<Config>,
    started_at: Instant,
}

impl ChatServer {
    /// Create a server backed by the real vendor adapters
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let service = ChatService::new(Arc::clone(&config))?;
        Self::build(config, service)
    }

    /// Create a server with a custom adapter factory
    pub fn with_factory(config: Config, factory: Arc<dyn ProviderFactory>) -> Result<Self> {
        let config = Arc::new(config);
        let service = ChatService::with_factory(Arc::clone(&config), factory);
        Self::build(config, service)
    }

    fn build(config: Arc<Config>, service: ChatService) -> Result<Self> {
        Ok(Self {
            service,
            metrics: ChatMetrics::new()?,
            config,
            started_at: Instant::now(),
        })
    }

    /// Router with tracing and CORS layers applied
    pub fn into_router(self) -> axum::Router {
        let cors = self.config.server.cors_permissive;
        let mut app = create_router(Arc::new(self)).layer(TraceLayer::new_for_http());
        if cors {
            app = app.layer(CorsLayer::permissive());
        }
        app
    }

    /// Start the HTTP server and run until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self
            .config
            .server
            .bind_address
            .parse()
            .with_context(|| format!("Invalid bind address {}", self.config.server.bind_address))?;

        tracing::info!(
            protocol = ?self.config.server.stream_protocol,
            providers = ?self.config.usable_server_providers(),
            "Starting Sahiti chat server on {}",
            addr
        );

        let app = self.into_router();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server stopped");
        Ok(())
    }

    pub fn service(&self) -> &ChatService {
        &self.service
    }

    pub fn metrics(&self) -> &ChatMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
