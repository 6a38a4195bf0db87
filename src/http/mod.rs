//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request id)
//!     → handlers.rs (forward / preflight / info)
//!     → relay (validate, forward, normalize)
//!     → response.rs (CORS + diagnostic headers, error bodies)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRelayRequestId, RequestIdExt, X_REQUEST_ID};
pub use response::{X_PROXY_BY, X_TARGET_STATUS, X_TARGET_URL};
pub use server::{AppState, HttpServer, ServerError};
