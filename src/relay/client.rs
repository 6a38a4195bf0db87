//! The outbound HTTP call.
//!
//! # Design Decisions
//! - One `reqwest::Client` per server, with idle pooling disabled: each
//!   relay call owns its connection for the lifetime of the request only
//! - The whole exchange (send + full body read) runs under one
//!   `tokio::time::timeout`; expiry drops the in-flight future
//! - System proxy variables are ignored; the relay dials targets directly

use std::time::{Duration, Instant};

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::config::TimeoutConfig;
use crate::relay::error::RelayError;
use crate::relay::normalize::normalize_body;
use crate::relay::outbound::OutboundRequest;
use crate::relay::target::TargetUrl;

/// What came back from upstream, already normalized.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub method: Method,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub target: TargetUrl,
    pub elapsed: Duration,
}

/// Issues outbound calls.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client,
    connect_timeout: Duration,
}

impl Forwarder {
    pub fn new(timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let connect_timeout = Duration::from_secs(timeouts.connect_secs);
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(0)
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            connect_timeout,
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Execute the call and normalize the response body.
    pub async fn send(&self, request: OutboundRequest) -> Result<UpstreamResponse, RelayError> {
        let OutboundRequest {
            method,
            target,
            headers,
            body,
            timeout,
        } = request;

        let mut builder = self
            .client
            .request(method.clone(), target.as_str())
            .headers(headers);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let start = Instant::now();
        let exchange = async {
            let response = builder.send().await?;
            let status = response.status();
            let headers = response.headers().clone();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, headers, text))
        };

        let (status, headers, text) = match tokio::time::timeout(timeout, exchange).await {
            Ok(Ok(parts)) => parts,
            // The client only carries a connect deadline, so a client-side
            // timeout is always a connect timeout.
            Ok(Err(e)) => return Err(RelayError::from_upstream(e, self.connect_timeout)),
            Err(_) => return Err(RelayError::Timeout(timeout)),
        };

        Ok(UpstreamResponse {
            method,
            status,
            headers,
            body: normalize_body(&text),
            target,
            elapsed: start.elapsed(),
        })
    }
}
