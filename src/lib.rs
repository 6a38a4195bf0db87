//! CORS relay library.
//!
//! A single endpoint that forwards a caller-described HTTP request to an
//! arbitrary target and returns the result as JSON with permissive CORS
//! headers, so browser code can reach third-party APIs.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{Relay, RelayError, RelayOptions, RelayRequest};
