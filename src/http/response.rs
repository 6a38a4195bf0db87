//! Response shaping.
//!
//! # Responsibilities
//! - Attach permissive CORS headers to every relay response
//! - Add diagnostic headers (`X-Proxy-By`, `X-Target-URL`, `X-Target-Status`)
//! - Render [`RelayError`] as a JSON error body with its mapped status

use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::relay::{RelayError, UpstreamResponse};

pub const X_PROXY_BY: HeaderName = HeaderName::from_static("x-proxy-by");
pub const X_TARGET_URL: HeaderName = HeaderName::from_static("x-target-url");
pub const X_TARGET_STATUS: HeaderName = HeaderName::from_static("x-target-status");

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";
const EXPOSE_HEADERS: &str = "X-Proxy-By, X-Target-URL, X-Target-Status, X-Request-Id";
const MAX_AGE_SECS: &str = "86400";

/// The permissive CORS set shared by relay and error responses.
pub fn apply_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static(MAX_AGE_SECS));
}

/// Headers for an `OPTIONS` preflight answer.
pub fn preflight_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    apply_cors(&mut headers);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers
}

/// Build the client-facing response for a completed upstream call.
///
/// Status mirrors upstream; the body is the normalized JSON.
pub fn relayed(upstream: UpstreamResponse, proxy_by: &HeaderValue) -> Response {
    let mut response = (upstream.status, Json(upstream.body)).into_response();
    let headers = response.headers_mut();

    apply_cors(headers);
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static(EXPOSE_HEADERS),
    );
    headers.insert(X_PROXY_BY, proxy_by.clone());
    if let Ok(target) = HeaderValue::from_str(upstream.target.as_str()) {
        headers.insert(X_TARGET_URL, target);
    }
    headers.insert(X_TARGET_STATUS, HeaderValue::from(upstream.status.as_u16()));

    response
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.label(),
            "message": self.to_string(),
            "type": self.kind(),
        });
        let mut response = (self.status(), Json(body)).into_response();
        apply_cors(response.headers_mut());
        response
    }
}
