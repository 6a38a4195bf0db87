//! Inbound request envelope.
//!
//! ```json
//! { "url": "https://api.example.com/data",
//!   "options": { "method": "POST", "headers": {...}, "body": {...}, "timeoutMs": 5000 } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::relay::error::RelayError;

/// What the caller wants relayed.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RelayRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RelayOptions>,
}

impl RelayRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            options: None,
        }
    }

    pub fn with_options(mut self, options: RelayOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Decode an envelope from the raw inbound body.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice(bytes).map_err(RelayError::InvalidRequestBody)
    }
}

/// The recognized subset of fetch-style options.
///
/// Anything else the caller sends lands in `ignored`; those fields are never
/// forwarded.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(flatten)]
    pub ignored: Map<String, Value>,
}

impl RelayOptions {
    pub fn ignored_fields(&self) -> impl Iterator<Item = &str> {
        self.ignored.keys().map(String::as_str)
    }
}
