//! # HTTP Request
//!
//! Request wrapper the binding layer consumes: method, path, parsed query
//! pairs, headers, and the collected body. This is the seam towards the
//! hosting framework; anything hyper-specific stays behind
//! [`Request::from_hyper_with_limit`].
//!
//! ## Design Principles
//!
//! - **S**: Request only handles request data, not response
//! - **O**: Extensible via new methods without breaking changes
//! - **D**: The binder never sees hyper types

use crate::error::{Error, Result};
use http_body_util::BodyExt;
use hyper::body::Bytes;
use std::collections::HashMap;
use std::fmt;

/// HTTP methods understood by the binding layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP PATCH
    Patch,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Put => write!(f, "PUT"),
            Self::Delete => write!(f, "DELETE"),
            Self::Patch => write!(f, "PATCH"),
            Self::Head => write!(f, "HEAD"),
            Self::Options => write!(f, "OPTIONS"),
        }
    }
}

/// HTTP request wrapper
///
/// Query pairs are parsed eagerly; the body is collected once and cached.
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP method
    pub method: Method,
    /// Request path (without query string)
    pub path: String,
    /// Raw query string (e.g. "page=1&limit=10")
    query_string: Option<String>,
    /// Parsed query pairs in order of appearance
    query_pairs: Vec<(String, String)>,
    /// Request headers
    headers: hyper::HeaderMap,
    /// Request body (collected)
    body: Option<Bytes>,
}

impl Request {
    /// Create a request manually (testing and direct embedding)
    #[must_use]
    pub fn new(
        method: Method,
        path: String,
        headers_map: HashMap<String, String>,
        body: Option<Bytes>,
    ) -> Self {
        let (path, query_string) = if let Some((p, q)) = path.split_once('?') {
            (p.to_string(), Some(q.to_string()))
        } else {
            (path, None)
        };

        let query_pairs = parse_query_string(query_string.as_deref());

        let mut headers = hyper::HeaderMap::new();
        for (k, v) in headers_map {
            if let (Ok(n), Ok(v)) = (
                hyper::header::HeaderName::from_bytes(k.as_bytes()),
                hyper::header::HeaderValue::from_str(&v),
            ) {
                headers.insert(n, v);
            }
        }

        Self {
            method,
            path,
            query_string,
            query_pairs,
            headers,
            body,
        }
    }

    /// Create from a hyper request without a body limit
    ///
    /// # Errors
    ///
    /// Currently infallible; kept fallible for parity with
    /// [`Request::from_hyper_with_limit`].
    pub async fn from_hyper<B>(req: hyper::Request<B>) -> Result<Self>
    where
        B: hyper::body::Body,
    {
        Self::from_hyper_with_limit(req, usize::MAX).await
    }

    /// Create from a hyper request, collecting the body
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] when the body exceeds the limit.
    pub async fn from_hyper_with_limit<B>(
        req: hyper::Request<B>,
        max_body_size: usize,
    ) -> Result<Self>
    where
        B: hyper::body::Body,
    {
        let method = match *req.method() {
            hyper::Method::POST => Method::Post,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::PATCH => Method::Patch,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::OPTIONS => Method::Options,
            _ => Method::Get,
        };

        let uri = req.uri();
        let path = uri.path().to_string();
        let query_string = uri.query().map(String::from);
        let query_pairs = parse_query_string(query_string.as_deref());
        let headers = req.headers().clone();

        if let Some(len) = headers.get(hyper::header::CONTENT_LENGTH) {
            if let Some(content_len) = len.to_str().ok().and_then(|s| s.parse::<usize>().ok()) {
                if content_len > max_body_size {
                    return Err(Error::PayloadTooLarge {
                        limit: max_body_size,
                        actual: content_len,
                    });
                }
            }
        }

        let body = match BodyExt::collect(req.into_body()).await {
            Ok(collected) => {
                let bytes = collected.to_bytes();
                if bytes.len() > max_body_size {
                    return Err(Error::PayloadTooLarge {
                        limit: max_body_size,
                        actual: bytes.len(),
                    });
                }
                if bytes.is_empty() {
                    None
                } else {
                    Some(bytes)
                }
            }
            Err(_) => None,
        };

        Ok(Self {
            method,
            path,
            query_string,
            query_pairs,
            headers,
            body,
        })
    }

    /// Get a header value by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set or override a header
    pub fn set_header(&mut self, name: &str, value: &str) {
        if let (Ok(n), Ok(v)) = (
            hyper::header::HeaderName::from_bytes(name.as_bytes()),
            hyper::header::HeaderValue::from_str(value),
        ) {
            self.headers.insert(n, v);
        }
    }

    /// Query pairs in order of appearance
    #[must_use]
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query_pairs
    }

    /// First value for a query key; duplicate keys keep all pairs but
    /// single-valued reads take the first occurrence
    #[must_use]
    pub fn query_first(&self, name: &str) -> Option<&str> {
        self.query_pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Raw query string
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.query_string.as_deref()
    }

    /// The request body as bytes
    #[must_use]
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_ref().map(|b| b.as_ref())
    }

    /// The request body as a UTF-8 string
    #[must_use]
    pub fn body_str(&self) -> Option<&str> {
        self.body_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Parse the body as form-encoded fields into a multi-valued mapping
    ///
    /// An absent or non-UTF-8 body yields an empty mapping.
    #[must_use]
    pub fn form_fields(&self) -> HashMap<String, Vec<String>> {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (k, v) in parse_query_string(self.body_str()) {
            fields.entry(k).or_default().push(v);
        }
        fields
    }
}

/// Parse a query string into ordered pairs
///
/// Handles URL decoding; duplicate keys are all kept.
fn parse_query_string(query: Option<&str>) -> Vec<(String, String)> {
    query
        .map(|q| {
            q.split('&')
                .filter(|pair| !pair.is_empty())
                .filter_map(|pair| {
                    let mut parts = pair.splitn(2, '=');
                    let key = parts.next()?;
                    let value = parts.next().unwrap_or("");
                    Some((url_decode(key), url_decode(value)))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Basic URL decoding
fn url_decode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '+' => result.push(' '),
            '%' => {
                let hex: String = chars.by_ref().take(2).collect();
                if hex.len() == 2 {
                    if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                        result.push(byte as char);
                    } else {
                        result.push('%');
                        result.push_str(&hex);
                    }
                } else {
                    result.push('%');
                    result.push_str(&hex);
                }
            }
            _ => result.push(c),
        }
    }
    result
}
