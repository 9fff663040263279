use super::{normalize, RawResponse};
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Body of a response whose `Content-Type` starts with `application/json`.
    Json(Value),
    /// Body of any other response, kept as text (possibly empty).
    Text(String),
    /// A JSON content type whose body failed to decode; holds the raw text.
    InvalidJson(String),
}

impl Body {
    /// Returns the decoded JSON value, if any.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consumes the body, returning the decoded JSON value, if any.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the raw text for non-JSON bodies.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Body::Text(text) | Body::InvalidJson(text) => Some(text),
            Body::Json(_) => None,
        }
    }
}

/// A normalized response from the Salesforce REST API.
///
/// Any HTTP status is a valid response: 4xx and 5xx results are returned
/// here for the caller to interpret rather than raised as errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: u16,
    body: Body,
    headers: HeaderMap,
}

impl Response {
    pub fn new(status: u16, body: Body, headers: HeaderMap) -> Self {
        Self {
            status,
            body,
            headers,
        }
    }

    /// Normalizes a raw transport response.
    pub fn from_raw(raw: &RawResponse) -> Self {
        let (headers, body) = normalize::parse_response(raw.header_len, &raw.data);
        Self::new(raw.status, body, headers)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn into_body(self) -> Body {
        self.body
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_raw_json() {
        let head = "HTTP/1.1 200 OK\r\nContent-Type: application/json;charset=UTF-8\r\n\r\n";
        let mut data = head.as_bytes().to_vec();
        data.extend_from_slice(br#"{"Id":"001xx"}"#);
        let raw = RawResponse {
            status: 200,
            header_len: head.len(),
            data,
        };

        let response = Response::from_raw(&raw);
        assert_eq!(response.status(), 200);
        assert!(response.is_success());
        assert_eq!(response.body().as_json(), Some(&json!({"Id": "001xx"})));
        assert_eq!(
            response.header("content-type"),
            Some("application/json;charset=UTF-8")
        );
    }

    #[test]
    fn test_body_accessors() {
        assert_eq!(Body::Text("x".into()).as_text(), Some("x"));
        assert_eq!(Body::InvalidJson("{".into()).as_text(), Some("{"));
        assert!(Body::InvalidJson("{".into()).as_json().is_none());
        assert_eq!(Body::Json(json!(1)).into_json(), Some(json!(1)));
        assert!(Body::Json(json!(1)).as_text().is_none());
    }

    #[test]
    fn test_error_status_is_a_response() {
        let response = Response::new(404, Body::Text(String::new()), HeaderMap::new());
        assert_eq!(response.status(), 404);
        assert!(!response.is_success());
        assert_eq!(response.into_body(), Body::Text(String::new()));
    }
}
