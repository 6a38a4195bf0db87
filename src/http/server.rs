//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router for the relay path
//! - Wire up middleware (tracing, body limit, request id, timeout backstop)
//! - Bind server to listener and shut down gracefully

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::post,
    Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::handlers::{forward, info, info_document, preflight};
use crate::http::request::MakeRelayRequestId;
use crate::relay::{Relay, RelayError};

/// Slack on top of the upstream timeout before the server-level backstop fires.
const BACKSTOP_SLACK_SECS: u64 = 5;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub proxy_by: HeaderValue,
    pub max_body_size: usize,
    pub info: Arc<Value>,
}

/// Errors building the server from a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to initialize relay: {0}")]
    Relay(#[from] RelayError),

    #[error("proxy name '{0}' is not a valid header value")]
    InvalidProxyName(String),
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> Result<Self, ServerError> {
        let relay = Relay::new(&config.relay, &config.timeouts)?;
        let proxy_by = HeaderValue::from_str(&config.relay.proxy_name)
            .map_err(|_| ServerError::InvalidProxyName(config.relay.proxy_name.clone()))?;

        let state = AppState {
            relay: Arc::new(relay),
            proxy_by,
            max_body_size: config.relay.max_body_size,
            info: Arc::new(info_document(&config.relay.path)),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        let backstop = Duration::from_secs(config.timeouts.upstream_secs + BACKSTOP_SLACK_SECS);

        Router::new()
            .route(
                &config.relay.path,
                post(forward).options(preflight).get(info),
            )
            .with_state(state)
            .layer(DefaultBodyLimit::max(config.relay.max_body_size))
            .layer(TimeoutLayer::new(backstop))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRelayRequestId))
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            path = %self.config.relay.path,
            environment = %self.config.relay.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}
