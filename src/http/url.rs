//! URL assembly for REST calls.

use serde_json::Value;
use url::form_urlencoded;

/// Join `path` onto `base`. Absolute `http(s)://` paths pass through unchanged.
pub fn join_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// `?k=v&...` from a JSON object, skipping null values. Empty when nothing remains.
///
/// Keys keep their insertion order. Arrays become comma-joined lists.
pub fn encode_query(params: Option<&Value>) -> String {
    let Some(Value::Object(map)) = params else {
        return String::new();
    };

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in map {
        if value.is_null() {
            continue;
        }
        serializer.append_pair(key, &query_value(value));
        any = true;
    }

    if any {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(query_value).collect::<Vec<_>>().join(","),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_url() {
        let base = "https://api.test/api/app";
        assert_eq!(join_url(base, "/dao/list"), "https://api.test/api/app/dao/list");
        assert_eq!(join_url(base, "dao/list"), "https://api.test/api/app/dao/list");
        assert_eq!(join_url(base, "https://other.test/x"), "https://other.test/x");
    }

    #[test]
    fn test_encode_query_skips_nulls() {
        let query = json!({"chainId": "AELF", "skip": 0, "cursor": null, "flag": true});
        assert_eq!(encode_query(Some(&query)), "?chainId=AELF&skip=0&flag=true");
    }

    #[test]
    fn test_encode_query_escapes_and_joins() {
        let query = json!({"q": "a b&c", "ids": ["x", 2]});
        assert_eq!(encode_query(Some(&query)), "?q=a+b%26c&ids=x%2C2");
    }

    #[test]
    fn test_encode_query_empty() {
        assert_eq!(encode_query(None), "");
        assert_eq!(encode_query(Some(&json!({}))), "");
        assert_eq!(encode_query(Some(&json!({"a": null}))), "");
    }
}
