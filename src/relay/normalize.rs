//! Upstream response normalization.

use serde_json::{json, Value};

pub const NOT_JSON_NOTE: &str = "Response is not valid JSON, returning as text";

/// Parse the upstream body as JSON. Empty bodies become `null`; anything
/// unparseable is wrapped as `{ "_proxy_note": ..., "text": <raw> }`.
pub fn normalize_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| {
        json!({
            "_proxy_note": NOT_JSON_NOTE,
            "text": text,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_passes_through() {
        assert_eq!(normalize_body(r#"{"ok":true}"#), json!({"ok": true}));
        assert_eq!(normalize_body("[1,2]"), json!([1, 2]));
        assert_eq!(normalize_body("42"), json!(42));
    }

    #[test]
    fn empty_body_is_null() {
        assert_eq!(normalize_body(""), Value::Null);
    }

    #[test]
    fn text_is_wrapped() {
        assert_eq!(
            normalize_body("hello"),
            json!({"_proxy_note": NOT_JSON_NOTE, "text": "hello"})
        );
        let html = "<html><body>502</body></html>";
        assert_eq!(normalize_body(html)["text"], html);
    }
}
