// src/utils/json_extract.rs
//! Recovery of JSON objects embedded in non-JSON text.
//!
//! Script hosting platforms sometimes wrap a JSON reply in an HTML page. The
//! scanner below finds balanced `{...}` spans, honouring nested braces and
//! double-quoted string literals, and returns the first one that decodes as
//! a JSON object.

use serde_json::Value;

/// Strict parse first; falls back to the first embedded object.
pub fn parse_tolerant(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Some(value),
        Err(_) => extract_object(text),
    }
}

/// Returns the first balanced `{...}` span that parses as a JSON object.
pub fn extract_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();

    for (start, _) in text.match_indices('{') {
        let Some(end) = balanced_end(bytes, start) else {
            continue;
        };
        if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(&text[start..=end]) {
            return Some(value);
        }
    }

    None
}

/// Index of the `}` closing the brace at `start`, if the span is balanced.
fn balanced_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &byte) in bytes[start..].iter().enumerate() {
        if in_string {
            match byte {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match byte {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_strict_json_wins() {
        assert_eq!(parse_tolerant(r#" {"success":true} "#), Some(json!({"success": true})));
        assert_eq!(parse_tolerant("[1,2]"), Some(json!([1, 2])));
    }

    #[test]
    fn test_nested_object_not_truncated() {
        let body = r#"<html><p>{"success":true,"data":{"rows":[{"id":"a"}]}}</p><p>{"x":1}</p></html>"#;
        assert_eq!(
            extract_object(body),
            Some(json!({"success": true, "data": {"rows": [{"id": "a"}]}}))
        );
    }

    #[test]
    fn test_braces_inside_strings() {
        let body = r#"prefix {"error":"unexpected } in {template}","success":false} suffix"#;
        assert_eq!(
            extract_object(body),
            Some(json!({"error": "unexpected } in {template}", "success": false}))
        );
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let body = r#"<b>{"error":"say \"}\" twice","success":false}</b>"#;
        assert_eq!(
            extract_object(body).and_then(|v| v["error"].as_str().map(str::to_string)),
            Some(r#"say "}" twice"#.to_string())
        );
    }

    #[test]
    fn test_skips_css_blocks() {
        let body = r#"<style>body { color: red; }</style><div>{"success":true}</div>"#;
        assert_eq!(extract_object(body), Some(json!({"success": true})));
    }

    #[test]
    fn test_unbalanced_or_missing() {
        assert_eq!(extract_object("<html>no json here</html>"), None);
        assert_eq!(extract_object(r#"{"success":true"#), None);
        assert_eq!(parse_tolerant("}{"), None);
    }
}
