//! # Turnstile Core
//!
//! Request/response validation layer for HTTP handlers: declared
//! parameter schemas, type coercion of query/path/body values, and
//! schema-checked JSON responses through a pluggable codec.
//!
//! ## Architecture
//!
//! Handlers register a [`HandlerSchema`] (built against a
//! [`TypeRegistry`]) once; per request a [`Validator`] binds the raw
//! inputs into typed [`Args`], runs the handler, and finalizes the
//! returned [`Reply`] into a JSON [`Response`]. Validation failures
//! render as a structured error body or raise, depending on the
//! [`AppContext`].
//!
//! ## Modules
//!
//! - `validate` - Validator entry point wrapping registered handlers
//! - `binder` - Per-request binding of query, path and body values
//! - `finalize` - Reply-to-response conversion with response validation
//! - `schema` - Handler parameter/response schemas and their builder
//! - `registry` - Named type declarations and coercion
//! - `types` - Scalar field types, values and conversion
//! - `serializer` - Encode/decode hooks bridging scalars and JSON
//! - `provider` - JSON codec with debug-aware pretty printing
//! - `json` - High-performance JSON parsing with simd-json
//! - `request` - HTTP request wrapper with headers and query parsing
//! - `response` - HTTP response wrapper
//! - `reply` - Handler return value (body plus optional status/headers)
//! - `config` - Application context flags and installed codec
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod binder;
pub mod config;
pub mod error;
pub mod finalize;
pub mod json;
pub mod provider;
pub mod registry;
pub mod reply;
pub mod request;
pub mod response;
pub mod schema;
pub mod serializer;
pub mod types;
pub mod validate;

pub use binder::{bind, Args, BindOutcome, ErrorDetail, Rejection};
pub use config::AppContext;
pub use error::{Error, Result};
pub use finalize::finalize;
pub use json::{parse_json, parse_json_bytes, to_json, to_json_pretty};
pub use provider::{JsonCodec, JsonProvider};
pub use registry::{TypeDecl, TypeRegistry};
pub use reply::Reply;
pub use request::{Method, Request};
pub use response::Response;
pub use schema::{HandlerSchema, SchemaBuilder, BODY_PARAM};
pub use serializer::{Markup, ToMarkup};
pub use types::{FieldType, FieldValue, Strictness};
pub use validate::{ValidateOptions, Validator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
