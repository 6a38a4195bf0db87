//! Shared harness for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    http::{HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use cors_relay::config::{Environment, RelayConfig};
use cors_relay::{HttpServer, Shutdown};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Serve `router` on an ephemeral local port.
pub async fn start_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

/// An upstream exposing the shapes the relay has to cope with.
pub fn mock_api() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/json", get(|| async { Json(json!({"lots": [{"id": 1, "title": "Vase"}]})) }))
        .route("/text", get(|| async { (StatusCode::ACCEPTED, "hello") }))
        .route("/empty", get(|| async { "" }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"error": "nope"}))) }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"late": true}))
            }),
        )
}

/// Reflects method, headers and raw body back as JSON.
async fn echo(method: Method, headers: HeaderMap, body: String) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "headers": headers,
        "body": body,
    }))
}

/// Development-mode config so loopback targets are allowed.
pub fn dev_config() -> RelayConfig {
    let mut config = RelayConfig::default();
    config.relay.environment = Environment::Development;
    config
}

/// Start the relay on an ephemeral port. Trigger the returned handle to stop it.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// A local port with nothing listening on it.
pub async fn closed_port() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}
