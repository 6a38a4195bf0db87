//! Turning a validated envelope into the single outbound call.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use crate::relay::error::RelayError;
use crate::relay::target::TargetUrl;

const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";

/// Everything needed to issue the upstream request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub target: TargetUrl,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub timeout: Duration,
}

/// Parse `options.method`, defaulting to `GET`. Tokens are upper-cased so
/// `post` and `POST` behave the same.
pub fn parse_method(raw: Option<&str>) -> Result<Method, RelayError> {
    let Some(raw) = raw else {
        return Ok(Method::GET);
    };
    Method::from_bytes(raw.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| RelayError::InvalidOptions(format!("invalid method '{raw}'")))
}

/// `null`, `false`, `0` and `""` mean "no body".
fn is_present(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Attach the body to the outbound request, if the method allows one.
///
/// String bodies go out verbatim and keep whatever `Content-Type` the caller
/// set, defaulting to `text/plain;charset=UTF-8` when none was. Any other
/// JSON value is serialized and forces `Content-Type: application/json`,
/// overriding the caller's header.
pub fn encode_body(
    method: &Method,
    body: Option<&Value>,
    headers: &mut HeaderMap,
) -> Result<Option<String>, RelayError> {
    if *method == Method::GET || *method == Method::HEAD {
        return Ok(None);
    }
    let Some(body) = body.filter(|b| is_present(b)) else {
        return Ok(None);
    };

    match body {
        Value::String(s) => {
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF8));
            }
            Ok(Some(s.clone()))
        }
        other => {
            let encoded =
                serde_json::to_string(other).map_err(|e| RelayError::Internal(Box::new(e)))?;
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Ok(Some(encoded))
        }
    }
}

/// Effective timeout: the caller may shorten the configured limit, never extend it.
pub fn effective_timeout(requested_ms: Option<u64>, limit: Duration) -> Result<Duration, RelayError> {
    match requested_ms {
        None => Ok(limit),
        Some(0) => Err(RelayError::InvalidOptions(
            "timeoutMs must be greater than 0".to_string(),
        )),
        Some(ms) => Ok(Duration::from_millis(ms).min(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_defaults_to_get_and_is_normalized() {
        assert_eq!(parse_method(None).unwrap(), Method::GET);
        assert_eq!(parse_method(Some("post")).unwrap(), Method::POST);
        assert_eq!(parse_method(Some("PATCH")).unwrap(), Method::PATCH);
        assert!(matches!(
            parse_method(Some("GE T")),
            Err(RelayError::InvalidOptions(_))
        ));
    }

    #[test]
    fn get_and_head_never_carry_a_body() {
        let mut headers = HeaderMap::new();
        let body = json!({"a": 1});
        assert_eq!(encode_body(&Method::GET, Some(&body), &mut headers).unwrap(), None);
        assert_eq!(encode_body(&Method::HEAD, Some(&body), &mut headers).unwrap(), None);
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn object_body_is_serialized_and_forces_json_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let body = json!({"name": "lot", "price": 10});
        let encoded = encode_body(&Method::POST, Some(&body), &mut headers).unwrap();
        assert_eq!(encoded.as_deref(), Some(r#"{"name":"lot","price":10}"#));
        assert_eq!(headers[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn string_body_keeps_caller_content_type() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let body = json!("raw=1&b=2");
        let encoded = encode_body(&Method::PUT, Some(&body), &mut headers).unwrap();
        assert_eq!(encoded.as_deref(), Some("raw=1&b=2"));
        assert_eq!(headers[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn string_body_without_content_type_defaults_to_text_plain() {
        let mut headers = HeaderMap::new();
        let body = json!("hello");
        let encoded = encode_body(&Method::POST, Some(&body), &mut headers).unwrap();
        assert_eq!(encoded.as_deref(), Some("hello"));
        assert_eq!(headers[CONTENT_TYPE], "text/plain;charset=UTF-8");
    }

    #[test]
    fn falsy_bodies_are_dropped() {
        for body in [json!(null), json!(false), json!(0), json!("")] {
            let mut headers = HeaderMap::new();
            assert_eq!(encode_body(&Method::POST, Some(&body), &mut headers).unwrap(), None);
            assert!(headers.is_empty());
        }
        let mut headers = HeaderMap::new();
        assert_eq!(
            encode_body(&Method::POST, Some(&json!([])), &mut headers).unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn timeout_is_capped() {
        let limit = Duration::from_secs(30);
        assert_eq!(effective_timeout(None, limit).unwrap(), limit);
        assert_eq!(effective_timeout(Some(250), limit).unwrap(), Duration::from_millis(250));
        assert_eq!(effective_timeout(Some(60_000), limit).unwrap(), limit);
        assert!(effective_timeout(Some(0), limit).is_err());
    }
}
