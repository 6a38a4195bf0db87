//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! inbound JSON body
//!     → envelope.rs (decode { url, options })
//!     → target.rs (parse URL, local-address policy)
//!     → headers.rs (defaults, caller overrides, strip identity headers)
//!     → outbound.rs (method, body encoding, timeout)
//!     → client.rs (single outbound call under timeout)
//!     → normalize.rs (JSON or { _proxy_note, text })
//! ```
//!
//! Every failure along the way is a [`RelayError`] carrying its own status.

pub mod client;
pub mod envelope;
pub mod error;
pub mod headers;
pub mod normalize;
pub mod outbound;
pub mod target;

use std::time::Duration;

use reqwest::header::HeaderValue;

pub use client::{Forwarder, UpstreamResponse};
pub use envelope::{RelayOptions, RelayRequest};
pub use error::RelayError;
pub use normalize::{normalize_body, NOT_JSON_NOTE};
pub use outbound::OutboundRequest;
pub use target::TargetUrl;

use crate::config::{Environment, RelaySettings, TimeoutConfig};

/// Validates envelopes and forwards them. Holds no per-request state.
#[derive(Debug, Clone)]
pub struct Relay {
    environment: Environment,
    user_agent: HeaderValue,
    timeout: Duration,
    forwarder: Forwarder,
}

impl Relay {
    pub fn new(settings: &RelaySettings, timeouts: &TimeoutConfig) -> Result<Self, RelayError> {
        let user_agent = HeaderValue::from_str(&settings.user_agent).map_err(|_| {
            RelayError::InvalidOptions(format!("invalid user agent '{}'", settings.user_agent))
        })?;
        let forwarder = Forwarder::new(timeouts).map_err(|e| RelayError::Internal(Box::new(e)))?;

        Ok(Self {
            environment: settings.environment,
            user_agent,
            timeout: Duration::from_secs(timeouts.upstream_secs),
            forwarder,
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Validate an envelope and build the outbound request, in order:
    /// URL present, URL well-formed, local-address policy, then options.
    pub fn prepare(&self, envelope: RelayRequest) -> Result<OutboundRequest, RelayError> {
        let target = TargetUrl::parse(envelope.url.as_deref())?;
        target.enforce_policy(self.environment)?;

        let options = envelope.options.unwrap_or_default();
        let ignored: Vec<&str> = options.ignored_fields().collect();
        if !ignored.is_empty() {
            tracing::debug!(fields = ?ignored, "Ignoring unrecognized relay options");
        }

        let method = outbound::parse_method(options.method.as_deref())?;
        let mut headers = headers::prepare_headers(options.headers.as_ref(), &self.user_agent)?;
        let body = outbound::encode_body(&method, options.body.as_ref(), &mut headers)?;
        let timeout = outbound::effective_timeout(options.timeout_ms, self.timeout)?;

        Ok(OutboundRequest {
            method,
            target,
            headers,
            body,
            timeout,
        })
    }

    /// Validate and execute one relay call.
    pub async fn execute(&self, envelope: RelayRequest) -> Result<UpstreamResponse, RelayError> {
        let request = self.prepare(envelope)?;
        tracing::debug!(
            method = %request.method,
            target = %request.target,
            timeout_ms = request.timeout.as_millis() as u64,
            has_body = request.body.is_some(),
            "Forwarding request"
        );
        self.forwarder.send(request).await
    }
}
