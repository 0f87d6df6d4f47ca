//! # Handler Reply
//!
//! Normalized handler return value. The hosting framework's four return
//! shapes (body, body+status, body+headers, body+status+headers) map onto
//! the option fields; any other shape is unrepresentable by construction.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;

/// Header list carried alongside a reply body
pub type ReplyHeaders = Vec<(String, String)>;

/// A handler's normalized return value
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Response body, pre-validation
    pub body: Value,
    /// Status override; `None` keeps the registered success status
    pub status: Option<u16>,
    /// Headers merged onto the final response
    pub headers: Option<ReplyHeaders>,
}

impl Reply {
    /// A bare-body reply
    #[must_use]
    pub fn new(body: Value) -> Self {
        Self {
            body,
            status: None,
            headers: None,
        }
    }

    /// A reply from any serializable value
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Json`] if the value fails to
    /// serialize.
    pub fn of<T: Serialize>(value: &T) -> Result<Self> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// Override the response status
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a header
    #[must_use]
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers
            .get_or_insert_with(Vec::new)
            .push((key.to_string(), value.to_string()));
        self
    }

    /// Decompose into (body, status, headers)
    #[must_use]
    pub fn into_parts(self) -> (Value, Option<u16>, Option<ReplyHeaders>) {
        (self.body, self.status, self.headers)
    }
}

impl From<Value> for Reply {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}
