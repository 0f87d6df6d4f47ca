//! # Error Handling
//!
//! Centralized error types for turnstile core.
//! Uses `thiserror` for ergonomic error definitions.
//!
//! Errors fall into three families: configuration errors raised once at
//! registration time (always fatal to startup), client validation errors
//! raised or rendered per request, and response validation errors that
//! signal a server-side contract violation.

use crate::binder::ErrorDetail;
use thiserror::Error;

/// Result type alias for turnstile operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the turnstile runtime
#[derive(Error, Debug)]
pub enum Error {
    /// A declared parameter references a type name the registry cannot resolve
    #[error("Unable to resolve type `{type_name}` for `{param}` parameter")]
    UnknownType {
        /// The unresolved type name
        type_name: String,
        /// The parameter that declared it
        param: String,
    },

    /// Schema was built without a response type declaration
    #[error("Missing response type declaration")]
    MissingResponseType,

    /// A value could not be coerced to its declared type
    #[error("Cannot coerce `{value}` to {expected}: {reason}")]
    Coerce {
        /// Name of the expected type
        expected: String,
        /// Display form of the offending value
        value: String,
        /// Why the coercion failed
        reason: String,
    },

    /// Client validation failure, raised instead of rendered when the
    /// application context enables validation exceptions
    #[error("Validation failed ({status_code}): {error}")]
    Validation {
        /// Error kind name, e.g. `ValidationError`
        error: String,
        /// HTTP status the host should translate this into
        status_code: u16,
        /// Offending key and message, when known
        detail: Option<ErrorDetail>,
    },

    /// The handler's own return value violated its declared response type.
    /// Never rendered as a client error.
    #[error("Response validation failed: {reason}")]
    ResponseValidation {
        /// Underlying coercion or encode failure
        reason: String,
    },

    /// The encoder has no native representation for a value
    #[error("Value of type {type_name} is not JSON serializable")]
    UnsupportedEncode {
        /// Name of the offending type
        type_name: String,
    },

    /// The decode hook does not support the target type
    #[error("Type {type_name} is not supported")]
    UnsupportedDecode {
        /// Name of the unsupported target type
        type_name: String,
    },

    /// JSON payload failed to parse
    #[error("Decode error: {reason}")]
    Decode {
        /// Parser failure text
        reason: String,
    },

    /// A value failed to serialize
    #[error("Encode error: {reason}")]
    Encode {
        /// Serializer failure text
        reason: String,
    },

    /// Request payload too large
    #[error("Payload too large: limit={limit} bytes, received={actual} bytes")]
    PayloadTooLarge {
        /// Max allowed size
        limit: usize,
        /// Actual size
        actual: usize,
    },

    /// HTTP protocol error
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
