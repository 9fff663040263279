use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use reqwest::Method;
use serde_json::Value;

/// A logical request against the Salesforce REST API.
///
/// The URI is a path relative to the client's base URI (for example
/// `/services/data/v58.0/sobjects/Account/001xx`). Authenticators stamp
/// credentials onto the headers before dispatch.
///
/// # Examples
///
/// ```
/// use reqwest::header::HeaderValue;
/// use reqwest::Method;
/// use salesforce_rest::http::Request;
/// use serde_json::json;
///
/// let request = Request::new(Method::PATCH, "/services/data/v58.0/sobjects/Account/001xx")
///     .with_body(json!({"Name": "Acme"}))
///     .with_header("Sforce-Auto-Assign", HeaderValue::from_static("FALSE"));
/// assert_eq!(request.headers()["sforce-auto-assign"], "FALSE");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: String,
    body: Option<Value>,
    headers: HeaderMap,
}

impl Request {
    /// Creates a request with no body and no headers.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a header, replacing any header with the same name.
    pub fn with_header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets a header in place, replacing any header with the same name.
    pub fn set_header<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces all headers.
    pub fn set_headers(&mut self, headers: HeaderMap) -> &mut Self {
        self.headers = headers;
        self
    }

    /// Sets or clears the body in place.
    pub fn set_body(&mut self, body: Option<Value>) -> &mut Self {
        self.body = body;
        self
    }

    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    pub fn set_uri(&mut self, uri: impl Into<String>) -> &mut Self {
        self.uri = uri.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns true if the body should be sent for this request's method.
    pub(crate) fn carries_body(&self) -> bool {
        [Method::POST, Method::PATCH, Method::PUT, Method::OPTIONS].contains(&self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_request_is_empty() {
        let request = Request::new(Method::GET, "/services/data");
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.uri(), "/services/data");
        assert!(request.body().is_none());
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_set_header_overwrites() {
        let mut request = Request::new(Method::GET, "/")
            .with_header("authorization", HeaderValue::from_static("Bearer a"));
        request.set_header("Authorization", HeaderValue::from_static("Bearer b"));
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers()["Authorization"], "Bearer b");
    }

    #[test]
    fn test_setters() {
        let mut request = Request::new(Method::GET, "/a");
        request
            .set_method(Method::POST)
            .set_uri("/b")
            .set_body(Some(json!({"x": 1})));
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.uri(), "/b");
        assert_eq!(request.body(), Some(&json!({"x": 1})));

        let mut headers = HeaderMap::new();
        headers.insert("A", HeaderValue::from_static("1"));
        request.set_headers(headers);
        assert_eq!(request.headers()["a"], "1");
    }

    #[test]
    fn test_carries_body() {
        assert!(Request::new(Method::POST, "/").carries_body());
        assert!(Request::new(Method::PATCH, "/").carries_body());
        assert!(Request::new(Method::PUT, "/").carries_body());
        assert!(Request::new(Method::OPTIONS, "/").carries_body());
        assert!(!Request::new(Method::GET, "/").carries_body());
        assert!(!Request::new(Method::DELETE, "/").carries_body());
    }
}
