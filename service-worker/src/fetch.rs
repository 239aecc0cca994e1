//! Fetch Types
//!
//! Request and response values exchanged between the page, the worker,
//! the cache storage and the network.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde::{Deserialize, Serialize};

/// HTTP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
}

impl Default for RequestMethod {
    fn default() -> Self {
        Self::Get
    }
}

impl RequestMethod {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

/// Identity of a request inside a cache: method plus URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    /// Build a key from its parts.
    pub fn new(method: RequestMethod, url: &str) -> Self {
        Self(alloc::format!("{}:{}", method.as_str(), url))
    }

    /// Get the raw key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fetch request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Request URL
    pub url: String,
    /// HTTP method
    pub method: RequestMethod,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request body (if any)
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Create a new GET request
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: RequestMethod::Get,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Set the method
    pub fn with_method(mut self, method: RequestMethod) -> Self {
        self.method = method;
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Cache identity of this request
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method, &self.url)
    }
}

/// Fetch response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Final URL of the response
    pub url: String,
    /// Status code
    pub status: u16,
    /// Status text
    pub status_text: String,
    /// Response headers
    pub headers: BTreeMap<String, String>,
    /// Response body
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response with an empty body
    pub fn new(status: u16) -> Self {
        Self {
            url: String::new(),
            status,
            status_text: status_text_for(status).to_string(),
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Check if response is OK
    pub fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Get status text for status code
fn status_text_for(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        301 => "Moved Permanently",
        302 => "Found",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// Service Worker scope
///
/// A URL prefix, always ending in `/`. It may carry an origin
/// (`https://example.com/maze/`) or be a bare path (`/maze/`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Scope(String);

impl Scope {
    /// Create a new scope
    pub fn new(path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.ends_with('/') {
            path.push('/');
        }
        Self(path)
    }

    /// Get the path
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Check if a URL is within this scope
    pub fn contains(&self, url: &str) -> bool {
        url.starts_with(&self.0)
    }

    /// Resolve a URL against this scope.
    ///
    /// Absolute URLs are returned unchanged, root-relative paths keep the
    /// scope's origin, and relative paths (`./index.html`, `a/../b.png`)
    /// are joined onto the scope path. Only the path is normalized; the
    /// query and fragment are carried over byte for byte.
    pub fn resolve(&self, url: &str) -> String {
        let split = url.find(|c: char| c == '?' || c == '#').unwrap_or(url.len());
        let (path, suffix) = url.split_at(split);
        if path.contains("://") {
            return url.to_string();
        }

        let (origin, base) = self.split_origin();
        if path.starts_with('/') {
            return alloc::format!("{}{}", origin, url);
        }

        // Scope paths start and end with '/', so `base` names a directory.
        let dir = base.strip_prefix('/').unwrap_or(base);
        let dir = dir.strip_suffix('/').unwrap_or(dir);
        let mut segments: Vec<&str> = Vec::new();
        if !dir.is_empty() {
            segments.extend(dir.split('/'));
        }

        let parts: Vec<&str> = path.split('/').collect();
        let last = parts.len() - 1;
        for (i, segment) in parts.into_iter().enumerate() {
            match segment {
                "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
            if i == last && (segment == "." || segment == "..") {
                segments.push("");
            }
        }

        let mut resolved = String::from(origin);
        resolved.push('/');
        resolved.push_str(&segments.join("/"));
        resolved.push_str(suffix);
        resolved
    }

    /// Split `scheme://host` from the path part.
    fn split_origin(&self) -> (&str, &str) {
        match self.0.find("://") {
            Some(pos) => {
                let after = pos + 3;
                match self.0[after..].find('/') {
                    Some(slash) => self.0.split_at(after + slash),
                    None => (self.0.as_str(), "/"),
                }
            }
            None => ("", self.0.as_str()),
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new("/")
    }
}
