//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method};
use http_body_util::BodyExt;

/// An incoming HTTP request with its body fully buffered.
///
/// Path parameters are filled in by the [`Router`](crate::Router) once the
/// request reaches it; middleware running before routing sees none.
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    /// Builds a request by hand, e.g. to drive a handler chain in tests.
    pub fn new(method: Method, path: impl Into<String>, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            path: path.into(),
            headers,
            body: body.into(),
            params: HashMap::new(),
        }
    }

    /// Buffers the body of a hyper request.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Self, hyper::Error> {
        let (parts, body) = req.into_parts();
        let body = body.collect().await?.to_bytes();
        Ok(Self::new(parts.method, parts.uri.path(), parts.headers, body))
    }

    pub(crate) fn with_params(mut self, params: HashMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Mutable access for middleware that annotates the request, e.g. with a
    /// request id.
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }

    /// Header lookup. Names are case-insensitive; values that are not visible
    /// ASCII yield `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}
