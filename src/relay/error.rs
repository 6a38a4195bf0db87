//! Relay error classification.

use std::time::Duration;

use reqwest::StatusCode;

/// Every way a relay call can fail.
///
/// Each variant maps to a fixed HTTP status, a short `error` label and a
/// `type` tag; see [`RelayError::status`], [`RelayError::label`] and
/// [`RelayError::kind`]. The `Display` output becomes the `message` field.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Please provide a URL in the request body")]
    MissingUrl,

    #[error("The provided URL is not valid: {0}")]
    InvalidUrl(#[source] url::ParseError),

    #[error("Only http and https targets can be relayed, got '{0}'")]
    UnsupportedScheme(String),

    #[error("Cannot proxy to local addresses in production")]
    LocalTargetBlocked { host: String },

    #[error("{0}")]
    InvalidOptions(String),

    #[error("Request body must be a JSON object: {0}")]
    InvalidRequestBody(#[source] serde_json::Error),

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Upstream did not respond within {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Network(#[source] reqwest::Error),

    #[error("{0}")]
    Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RelayError {
    /// Classify a failure reported by the outbound client.
    pub fn from_upstream(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            RelayError::Timeout(timeout)
        } else if err.is_builder() {
            RelayError::Internal(Box::new(err))
        } else {
            RelayError::Network(err)
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MissingUrl
            | RelayError::InvalidUrl(_)
            | RelayError::UnsupportedScheme(_)
            | RelayError::InvalidOptions(_)
            | RelayError::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            RelayError::LocalTargetBlocked { .. } => StatusCode::FORBIDDEN,
            RelayError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            RelayError::Network(_) => StatusCode::BAD_GATEWAY,
            RelayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short, stable label for the `error` field.
    pub fn label(&self) -> &'static str {
        match self {
            RelayError::MissingUrl => "URL is required",
            RelayError::InvalidUrl(_) => "Invalid URL",
            RelayError::UnsupportedScheme(_) => "Unsupported URL scheme",
            RelayError::LocalTargetBlocked { .. } => "Local URLs not allowed",
            RelayError::InvalidOptions(_) => "Invalid options",
            RelayError::InvalidRequestBody(_) => "Invalid request body",
            RelayError::PayloadTooLarge { .. } => "Payload too large",
            RelayError::Timeout(_) => "Request timeout",
            RelayError::Network(_) => "Network error or invalid URL",
            RelayError::Internal(_) => "Internal proxy error",
        }
    }

    /// Error class, reported as `type` and used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::MissingUrl
            | RelayError::InvalidUrl(_)
            | RelayError::UnsupportedScheme(_)
            | RelayError::InvalidOptions(_)
            | RelayError::InvalidRequestBody(_)
            | RelayError::PayloadTooLarge { .. } => "ValidationError",
            RelayError::LocalTargetBlocked { .. } => "PolicyError",
            RelayError::Timeout(_) => "TimeoutError",
            RelayError::Network(_) => "NetworkError",
            RelayError::Internal(_) => "InternalError",
        }
    }
}
