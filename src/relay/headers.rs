//! Outbound header preparation.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, HOST, ORIGIN, REFERER, USER_AGENT};
use serde_json::{Map, Value};

use crate::relay::error::RelayError;

/// Headers that would leak the browser's identity or break the upstream call.
const STRIPPED: [HeaderName; 3] = [HOST, ORIGIN, REFERER];

/// Build outbound headers: defaults first, caller headers over them, then
/// strip `host`, `origin` and `referer`.
///
/// Names are case-insensitive, so a caller's `accept` replaces the default
/// `Accept`. Numbers and booleans are stringified; `null` values are skipped.
pub fn prepare_headers(
    caller: Option<&Map<String, Value>>,
    user_agent: &HeaderValue,
) -> Result<HeaderMap, RelayError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, user_agent.clone());

    for (name, value) in caller.into_iter().flatten() {
        let value = match value {
            Value::Null => continue,
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => {
                return Err(RelayError::InvalidOptions(format!(
                    "header '{name}' must be a string"
                )))
            }
        };
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RelayError::InvalidOptions(format!("invalid header name '{name}'")))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|_| RelayError::InvalidOptions(format!("invalid value for header '{name}'")))?;
        headers.insert(name, value);
    }

    for name in &STRIPPED {
        headers.remove(name);
    }

    Ok(headers)
}
