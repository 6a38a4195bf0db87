//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_requests_total` (counter): relay calls by method, status, outcome
//! - `relay_request_duration_seconds` (histogram): end-to-end latency by outcome
//! - `relay_upstream_errors_total` (counter): failed calls by error kind

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;
use reqwest::Method;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Collapse caller-chosen methods onto a fixed label set so the series
/// count stays bounded.
pub fn method_label(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::HEAD => "HEAD",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::PATCH => "PATCH",
        Method::DELETE => "DELETE",
        Method::OPTIONS => "OPTIONS",
        _ => "OTHER",
    }
}

/// Record a completed relay call. `method` is `None` when the call failed
/// before a method was settled.
pub fn record_request(method: Option<&Method>, status: u16, outcome: &'static str, start: Instant) {
    let method = method.map_or("none", method_label);
    metrics::counter!(
        "relay_requests_total",
        "method" => method,
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("relay_request_duration_seconds", "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}

/// Record a failed relay call by error kind.
pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("relay_upstream_errors_total", "kind" => kind).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn standard_methods_keep_their_label() {
        assert_eq!(method_label(&Method::GET), "GET");
        assert_eq!(method_label(&Method::PATCH), "PATCH");
        let custom = Method::from_bytes(b"PROPFIND").unwrap();
        assert_eq!(method_label(&custom), "OTHER");
    }

    #[test]
    fn custom_methods_share_one_series() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            for raw in ["M1", "M2", "PURGE"] {
                let method = Method::from_bytes(raw.as_bytes()).unwrap();
                record_request(Some(&method), 200, "relayed", Instant::now());
            }
            record_request(Some(&Method::GET), 200, "relayed", Instant::now());
        });

        let rendered = handle.render();
        let series: Vec<&str> = rendered
            .lines()
            .filter(|line| line.starts_with("relay_requests_total{"))
            .collect();
        assert_eq!(series.len(), 2, "{rendered}");
        assert!(series
            .iter()
            .any(|line| line.contains("method=\"OTHER\"") && line.ends_with(" 3")));
        assert!(!rendered.contains("M1"));
    }
}
