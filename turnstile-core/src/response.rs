//! # HTTP Response
//!
//! Response wrapper handed back to the hosting framework, convertible into
//! a hyper response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::StatusCode;
use std::collections::HashMap;

/// HTTP response wrapper
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    /// Response body
    pub body: Vec<u8>,
    /// Content type
    pub content_type: String,
    /// Response headers
    pub headers: HashMap<String, String>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            body: Vec::new(),
            content_type: "application/json".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl Response {
    /// Create a JSON response from already-encoded bytes
    #[must_use]
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Create a plain-text response
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self {
            body: body.into().into_bytes(),
            content_type: "text/plain".to_string(),
            ..Self::default()
        }
    }

    /// Set the status code
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Set a header, consuming self
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.set_header(key, value);
        self
    }

    /// Set or override a header
    pub fn set_header(&mut self, key: &str, value: &str) {
        if key.eq_ignore_ascii_case("content-type") {
            self.content_type = value.to_string();
        } else {
            self.headers.insert(key.to_string(), value.to_string());
        }
    }

    /// The body as a UTF-8 string, for assertions and logging
    #[must_use]
    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }

    /// Convert into a hyper response
    #[must_use]
    pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = hyper::Response::builder().status(status);
        builder = builder.header("Content-Type", &self.content_type);
        for (k, v) in &self.headers {
            if !k.eq_ignore_ascii_case("content-type") {
                builder = builder.header(k.as_str(), v.as_str());
            }
        }

        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|_| {
                hyper::Response::builder()
                    .status(StatusCode::INTERNAL_SERVER_ERROR)
                    .body(Full::new(Bytes::from_static(b"Internal Server Error")))
                    .unwrap_or_default()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_response() {
        let resp = Response::json(br#"{"status": "ok"}"#.to_vec());
        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, "application/json");
        assert_eq!(resp.body_str(), r#"{"status": "ok"}"#);
    }

    #[test]
    fn test_with_status() {
        let resp = Response::text("Not Found").with_status(404);
        assert_eq!(resp.status, 404);
        assert_eq!(resp.content_type, "text/plain");
    }

    #[test]
    fn test_content_type_header_routes_to_field() {
        let resp = Response::json(b"{}".to_vec()).with_header("Content-Type", "application/hal+json");
        assert_eq!(resp.content_type, "application/hal+json");
        assert!(resp.headers.is_empty());
    }

    #[test]
    fn test_into_hyper_carries_headers() {
        let resp = Response::json(b"{}".to_vec())
            .with_status(418)
            .with_header("x-trace", "1");
        let hyper_resp = resp.into_hyper();
        assert_eq!(hyper_resp.status(), 418);
        assert_eq!(
            hyper_resp.headers().get("x-trace").map(|v| v.to_str().unwrap()),
            Some("1")
        );
    }
}
