//! Splits a raw HTTP response into headers and a decoded body.

use super::Body;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Parses `data` as a header block of `header_len` bytes followed by the body.
///
/// The body is decoded as JSON only when a `Content-Type` header starting with
/// `application/json` is present. Decoding never fails: malformed JSON is
/// returned as [`Body::InvalidJson`].
pub fn parse_response(header_len: usize, data: &[u8]) -> (HeaderMap, Body) {
    let split = header_len.min(data.len());
    let (head, body) = data.split_at(split);
    let headers = parse_headers(&String::from_utf8_lossy(head));
    let body = String::from_utf8_lossy(body).into_owned();

    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|content_type| content_type.to_str().ok())
        .is_some_and(|content_type| content_type.starts_with(JSON_CONTENT_TYPE));

    let body = if is_json {
        decode_json(body)
    } else {
        Body::Text(body)
    };

    (headers, body)
}

/// Parses `Name: Value` lines.
///
/// Lines without a `": "` separator (such as the status line), lines whose
/// name is blank after trimming, and lines that are not a valid header name
/// or value are skipped. A repeated name overwrites the earlier value.
pub fn parse_headers(head: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for line in head.split('\n') {
        let Some((name, value)) = line.split_once(": ") else {
            continue;
        };
        let name = name.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\0');
        if name.is_empty() {
            continue;
        }
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value.trim_end_matches('\r')),
        ) else {
            continue;
        };
        headers.insert(name, value);
    }
    headers
}

fn decode_json(body: String) -> Body {
    match serde_json::from_str(&body) {
        Ok(value) => Body::Json(value),
        Err(_) => Body::InvalidJson(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(head: &str, body: &str) -> (usize, Vec<u8>) {
        let mut data = head.as_bytes().to_vec();
        data.extend_from_slice(body.as_bytes());
        (head.len(), data)
    }

    #[test]
    fn test_parse_json_response() {
        let (len, data) = raw("Content-Type: application/json\r\nX-Foo: bar\r\n", r#"{"a":1}"#);
        let (headers, body) = parse_response(len, &data);

        assert_eq!(headers.len(), 2);
        assert_eq!(headers["Content-Type"], "application/json");
        assert_eq!(headers["X-Foo"], "bar");
        assert_eq!(body, Body::Json(json!({"a": 1})));
    }

    #[test]
    fn test_parse_non_json_keeps_text() {
        let (len, data) = raw("Content-Type: text/csv\r\n\r\n", "Id,Name\n1,Acme\n");
        let (_, body) = parse_response(len, &data);
        assert_eq!(body, Body::Text("Id,Name\n1,Acme\n".to_string()));
    }

    #[test]
    fn test_missing_content_type_keeps_text() {
        let (len, data) = raw("X-Foo: bar\r\n", r#"{"a":1}"#);
        let (_, body) = parse_response(len, &data);
        assert_eq!(body, Body::Text(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn test_invalid_json_is_soft() {
        let (len, data) = raw("Content-Type: application/json\r\n", "{not json");
        let (_, body) = parse_response(len, &data);
        assert_eq!(body, Body::InvalidJson("{not json".to_string()));
    }

    #[test]
    fn test_lowercase_content_type_is_recognized() {
        let (len, data) = raw("content-type: application/json; charset=utf-8\r\n", "[1,2]");
        let (_, body) = parse_response(len, &data);
        assert_eq!(body, Body::Json(json!([1, 2])));
    }

    #[test]
    fn test_malformed_lines_are_dropped() {
        let headers = parse_headers(
            "HTTP/1.1 200 OK\r\nNoSeparator\r\n  : empty-name\r\nX-Keep: yes\r\nX-Colon:tight\r\n\
             Bad Name: spaced\r\nX-Ctl: a\x07b\r\n",
        );
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["X-Keep"], "yes");
    }

    #[test]
    fn test_duplicate_headers_last_wins() {
        let headers = parse_headers("Set-Cookie: a=1\r\nSet-Cookie: b=2\r\n");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers["Set-Cookie"], "b=2");
    }

    #[test]
    fn test_value_keeps_inner_separator() {
        let headers = parse_headers("Location: https://x.my.salesforce.com: 443\n");
        assert_eq!(headers["Location"], "https://x.my.salesforce.com: 443");
    }

    #[test]
    fn test_header_len_past_end_is_clamped() {
        let (headers, body) = parse_response(100, b"X-Foo: bar\r\n");
        assert_eq!(headers["X-Foo"], "bar");
        assert_eq!(body, Body::Text(String::new()));
    }
}
