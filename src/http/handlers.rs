//! The three entry points on the relay path.
//!
//! - `POST`    → [`forward`]: validate the envelope, make the call, relay the result
//! - `OPTIONS` → [`preflight`]: static CORS answer, empty body
//! - `GET`     → [`info`]: static service descriptor

use std::error::Error as _;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::http::request::RequestIdExt;
use crate::http::response::{preflight_headers, relayed};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::relay::{RelayError, RelayRequest};

/// Relay one request.
///
/// Never fails at the HTTP level: every error becomes a JSON body with the
/// status from the error table.
pub async fn forward(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let start = Instant::now();
    let request_id = headers.request_id();

    let result = match body {
        Ok(bytes) => match RelayRequest::from_slice(&bytes) {
            Ok(envelope) => state.relay.execute(envelope).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(classify_rejection(rejection, state.max_body_size)),
    };

    match result {
        Ok(upstream) => {
            tracing::info!(
                request_id = %request_id,
                method = %upstream.method,
                target = %upstream.target,
                upstream_status = upstream.status.as_u16(),
                upstream_ms = upstream.elapsed.as_millis() as u64,
                "Relayed request"
            );
            metrics::record_request(
                Some(&upstream.method),
                upstream.status.as_u16(),
                "relayed",
                start,
            );
            relayed(upstream, &state.proxy_by)
        }
        Err(err) => {
            let status = err.status();
            if status.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    kind = err.kind(),
                    message = %err,
                    cause = %source_chain(&err),
                    "Relay failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    kind = err.kind(),
                    message = %err,
                    "Relay rejected"
                );
            }
            metrics::record_upstream_error(err.kind());
            metrics::record_request(None, status.as_u16(), "failed", start);
            err.into_response()
        }
    }
}

/// Answer a CORS preflight. Ignores the request entirely.
pub async fn preflight() -> Response {
    (StatusCode::OK, preflight_headers()).into_response()
}

/// Describe the service.
pub async fn info(State(state): State<AppState>) -> Response {
    (
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(state.info.as_ref()),
    )
        .into_response()
}

/// The static document served by [`info`].
pub fn info_document(path: &str) -> Value {
    json!({
        "service": "CORS Relay",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST": format!("{path} - Proxy any HTTP request"),
            "OPTIONS": format!("{path} - CORS preflight"),
            "GET": format!("{path} - This info page"),
        },
        "usage": {
            "example": format!(
                "await fetch('{path}', {{\n  method: 'POST',\n  headers: {{ 'Content-Type': 'application/json' }},\n  body: JSON.stringify({{\n    url: 'https://api.example.com/data',\n    options: {{ method: 'GET' }}\n  }})\n}})"
            ),
            "options": ["method", "headers", "body", "timeoutMs"],
        },
    })
}

fn classify_rejection(rejection: BytesRejection, limit: usize) -> RelayError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        RelayError::PayloadTooLarge { limit }
    } else {
        RelayError::Internal(Box::new(rejection))
    }
}

/// `outer: inner: innermost` for logging.
fn source_chain(err: &RelayError) -> String {
    let mut parts = Vec::new();
    let mut current = err.source();
    while let Some(e) = current {
        parts.push(e.to_string());
        current = e.source();
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(": ")
    }
}
