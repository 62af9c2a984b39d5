// Request and response model for interception.
// Request identity is (method, url); responses carry status, headers, and body.

use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use http::{Method, StatusCode};
use serde::Serialize;
use url::Url;

use crate::error::Result;

/// Identity of a stored entry: full URL plus method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: Method,
    pub url: Url,
}

impl RequestKey {
    /// Stable string form, used by persistent storage backends.
    pub fn as_storage_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// An intercepted outbound request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    /// Identity under which a response for this request is stored.
    pub fn key(&self) -> RequestKey {
        RequestKey {
            method: self.method.clone(),
            url: self.url.clone(),
        }
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// URL path component, matched against the precache manifest.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Whether this request targets the same origin (scheme, host, port)
    /// as the given scope URL.
    pub fn same_origin(&self, scope: &Url) -> bool {
        self.url.origin() == scope.origin()
    }
}

/// Visibility of a response body to the interception layer.
///
/// Opaque responses model unreadable cross-origin payloads: their status,
/// headers, and body must never be inspected, tagged, or stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseKind {
    #[default]
    Basic,
    Opaque,
}

/// A response flowing back to the client, cached or live.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub kind: ResponseKind,
}

impl Response {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body,
            kind: ResponseKind::Basic,
        }
    }

    /// An opaque placeholder whose contents are off-limits.
    pub fn opaque() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Vec::new(),
            kind: ResponseKind::Opaque,
        }
    }

    /// Build a JSON response from a serializable body.
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Self> {
        let mut response = Self::new(status, serde_json::to_vec(body)?);
        response
            .headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(response)
    }

    pub fn is_opaque(&self) -> bool {
        self.kind == ResponseKind::Opaque
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set a header, replacing any prior value.
    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_key_includes_method_and_url() {
        let get = Request::get(url("https://app.example/a"));
        let head = Request::new(Method::HEAD, url("https://app.example/a"));
        assert_ne!(get.key(), head.key());
        assert_eq!(get.key(), Request::get(url("https://app.example/a")).key());
    }

    #[test]
    fn test_same_origin_rejects_scheme_host_port_changes() {
        let scope = url("https://app.example/");
        assert!(Request::get(url("https://app.example/deep/path?q=1")).same_origin(&scope));
        assert!(!Request::get(url("http://app.example/")).same_origin(&scope));
        assert!(!Request::get(url("https://other.example/")).same_origin(&scope));
        assert!(!Request::get(url("https://app.example:8443/")).same_origin(&scope));
    }

    #[test]
    fn test_json_response_sets_content_type() {
        let response =
            Response::json(StatusCode::OK, &serde_json::json!({ "now": "x" })).unwrap();
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.status, StatusCode::OK);
    }

    #[test]
    fn test_opaque_response_is_flagged() {
        assert!(Response::opaque().is_opaque());
        assert!(!Response::new(StatusCode::OK, Vec::new()).is_opaque());
    }
}
