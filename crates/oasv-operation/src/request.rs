//! # Request & Response Messages
//!
//! Transport-agnostic message shapes the operation validator consumes.
//! Builders keep construction terse in adapters and tests; accessors
//! normalize the parts validation cares about: header names compare
//! case-insensitively, query strings parse into an ordered multimap with
//! percent-decoding, and a query glued onto the path is split off at build
//! time.

use indexmap::IndexMap;

use crate::body::Body;
use crate::path::percent_decode;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    Trace,
}

impl Method {
    /// Lowercase name, matching the contract's path-item operation keys.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Delete => "delete",
            Method::Patch => "patch",
            Method::Head => "head",
            Method::Options => "options",
            Method::Trace => "trace",
        }
    }

    /// All methods an OpenAPI path item may declare.
    pub fn all() -> [Method; 8] {
        [
            Method::Get,
            Method::Post,
            Method::Put,
            Method::Delete,
            Method::Patch,
            Method::Head,
            Method::Options,
            Method::Trace,
        ]
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound HTTP request to validate against an operation.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    cookies: IndexMap<String, String>,
    body: Option<Body>,
}

impl Request {
    /// Start building a request. `path` may be a full URL or include a
    /// query string; both are normalized at build time.
    pub fn builder(path: impl Into<String>, method: Method) -> RequestBuilder {
        RequestBuilder {
            method,
            path: path.into(),
            query: String::new(),
            headers: Vec::new(),
            cookies: IndexMap::new(),
            body: None,
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    /// The request target as given, minus any query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The raw query string, without the leading `?`.
    pub fn query_string(&self) -> &str {
        &self.query
    }

    /// Parse the query string into an ordered name-to-values multimap.
    /// Names and values are percent-decoded; `+` reads as a space.
    pub fn query_params(&self) -> IndexMap<String, Vec<String>> {
        let mut params: IndexMap<String, Vec<String>> = IndexMap::new();
        for pair in self.query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = match pair.split_once('=') {
                Some((n, v)) => (n, v),
                None => (pair, ""),
            };
            let name = percent_decode(&name.replace('+', " "));
            let value = percent_decode(&value.replace('+', " "));
            params.entry(name).or_default().push(value);
        }
        params
    }

    /// First value of a header, compared case-insensitively by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, in insertion order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The `Content-Type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// A cookie by exact name.
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }
}

/// Builder for [`Request`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    cookies: IndexMap<String, String>,
    body: Option<Body>,
}

impl RequestBuilder {
    /// Set the raw query string (no leading `?`). Merged with any query
    /// already present on the path.
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Append a header. Repeated names keep every value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Request {
        let (path, path_query) = match self.path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (self.path, None),
        };
        let query = match (path_query, self.query.is_empty()) {
            (Some(pq), true) => pq,
            (Some(pq), false) => format!("{pq}&{}", self.query),
            (None, _) => self.query,
        };
        Request {
            method: self.method,
            path,
            query,
            headers: self.headers,
            cookies: self.cookies,
            body: self.body,
        }
    }
}

/// An outbound HTTP response to validate against an operation.
#[derive(Debug)]
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<Body>,
}

impl Response {
    pub fn builder(status: u16) -> ResponseBuilder {
        ResponseBuilder { status, headers: Vec::new(), body: None }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// First value of a header, compared case-insensitively by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The `Content-Type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }
}

/// Builder for [`Response`].
#[derive(Debug)]
pub struct ResponseBuilder {
    status: u16,
    headers: Vec<(String, String)>,
    body: Option<Body>,
}

impl ResponseBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn build(self) -> Response {
        Response { status: self.status, headers: self.headers, body: self.body }
    }
}
