use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};
use bytes::Bytes;

/// A fully-read inbound request.
///
/// Cloning is cheap: headers and body are shared.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: Arc<HeaderMap>,
    /// Transport-reported peer address (`ip:port`), empty when unknown.
    pub remote_addr: String,
    pub body: Bytes,
    /// Path parameters filled in by the route table.
    pub params: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: Arc::new(HeaderMap::new()),
            remote_addr: String::new(),
            body: Bytes::new(),
            params: Vec::new(),
        }
    }

    pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
        self.remote_addr = addr.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        if let Ok(v) = HeaderValue::from_str(value) {
            Arc::make_mut(&mut self.headers).insert(name, v);
        }
        self
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Path plus query, as sent on the request line.
    pub fn request_uri(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }

    pub fn proto(&self) -> &'static str {
        match self.version {
            Version::HTTP_09 => "HTTP/0.9",
            Version::HTTP_10 => "HTTP/1.0",
            Version::HTTP_11 => "HTTP/1.1",
            Version::HTTP_2 => "HTTP/2.0",
            Version::HTTP_3 => "HTTP/3.0",
            _ => "HTTP/?",
        }
    }

    /// Header value as text; `None` when absent or not visible ASCII.
    pub fn header_str(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> &str {
        self.header_str(header::USER_AGENT).unwrap_or("")
    }

    /// `X-Forwarded-For` when present and non-empty, else the peer address.
    pub fn client_addr(&self) -> &str {
        match self.header_str("x-forwarded-for") {
            Some(v) if !v.is_empty() => v,
            _ => self.remote_addr.as_str(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
