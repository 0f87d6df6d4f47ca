//! # Validator
//!
//! The registration-time entry point tying the layer together: a handler
//! is registered with a resolved [`HandlerSchema`] and a set of options;
//! per request the validator binds and coerces the inputs, invokes the
//! handler with the typed arguments, and finalizes the reply.
//!
//! One validator covers both rejection conventions (400 and 422) via
//! [`ValidateOptions::validation_status`] instead of two near-duplicate
//! wrappers.

use crate::binder::{bind, Args, BindOutcome};
use crate::config::AppContext;
use crate::error::Result;
use crate::finalize::finalize;
use crate::reply::Reply;
use crate::request::Request;
use crate::response::Response;
use crate::schema::HandlerSchema;
use crate::types::Strictness;
use std::collections::HashMap;

/// Per-handler validation options
#[derive(Debug, Clone, Copy)]
pub struct ValidateOptions {
    /// Response validation mode; `None` skips response validation
    pub strict_response: Option<Strictness>,
    /// Status for successful responses without an explicit override
    pub success_status: u16,
    /// Status for rendered validation failures
    pub validation_status: u16,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            strict_response: None,
            success_status: 200,
            validation_status: 400,
        }
    }
}

impl ValidateOptions {
    /// Enable response validation in the given mode
    #[must_use]
    pub fn response_validation(mut self, mode: Strictness) -> Self {
        self.strict_response = Some(mode);
        self
    }

    /// Set the default success status
    #[must_use]
    pub fn success_status(mut self, status: u16) -> Self {
        self.success_status = status;
        self
    }

    /// Set the status rendered for validation failures
    #[must_use]
    pub fn validation_status(mut self, status: u16) -> Self {
        self.validation_status = status;
        self
    }
}

/// A registered handler's validation wrapper
///
/// Holds the schema resolved at registration time; nothing is resolved
/// per request.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: HandlerSchema,
    options: ValidateOptions,
}

impl Validator {
    /// Wrap a resolved schema with default options
    #[must_use]
    pub fn new(schema: HandlerSchema) -> Self {
        Self {
            schema,
            options: ValidateOptions::default(),
        }
    }

    /// Wrap a resolved schema with explicit options
    #[must_use]
    pub fn with_options(schema: HandlerSchema, options: ValidateOptions) -> Self {
        Self { schema, options }
    }

    /// The cached schema
    #[must_use]
    pub fn schema(&self) -> &HandlerSchema {
        &self.schema
    }

    /// Bind the request, invoke the handler, finalize the reply
    ///
    /// `view_args` is the router-extracted path parameter mapping.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::Validation`] for client validation
    /// failures when the context enables validation exceptions (otherwise
    /// they render as a direct JSON error response), and
    /// [`crate::error::Error::ResponseValidation`] when the handler's
    /// reply violates the declared response type. Handler errors
    /// propagate unchanged.
    pub fn handle<F>(
        &self,
        req: &Request,
        view_args: &HashMap<String, String>,
        ctx: &AppContext,
        handler: F,
    ) -> Result<Response>
    where
        F: FnOnce(Args) -> Result<Reply>,
    {
        match bind(&self.schema, req, view_args, ctx)? {
            BindOutcome::Rejected(rejection) => {
                let body = serde_json::to_vec(&rejection)?;
                Ok(Response::json(body).with_status(self.options.validation_status))
            }
            BindOutcome::Bound(args) => {
                let reply = handler(args)?;
                finalize(reply, &self.schema, &self.options, ctx)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::provider::JsonProvider;
    use crate::registry::TypeRegistry;
    use crate::request::Method;
    use hyper::body::Bytes;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct CreateItem {
        name: String,
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Item {
        id: i64,
        name: String,
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_builtins();
        registry.register_struct::<CreateItem>("CreateItem");
        registry.register_struct::<Item>("Item");
        registry
    }

    fn validator(options: ValidateOptions) -> Validator {
        let schema = HandlerSchema::builder()
            .required("id", "int")
            .body("CreateItem")
            .returns("Item")
            .build(&registry())
            .unwrap();
        Validator::with_options(schema, options)
    }

    fn post(view_id: &str, body: &'static [u8]) -> (Request, HashMap<String, String>) {
        let req = Request::new(
            Method::Post,
            "/items".to_string(),
            HashMap::new(),
            Some(Bytes::from_static(body)),
        );
        let view = HashMap::from([("id".to_string(), view_id.to_string())]);
        (req, view)
    }

    fn create_item(args: Args) -> crate::error::Result<Reply> {
        let body: CreateItem = args.body()?;
        Reply::of(&Item {
            id: args.get_int("id").unwrap_or_default(),
            name: body.name,
        })
    }

    #[test]
    fn test_end_to_end_success_compact() {
        let v = validator(ValidateOptions::default().response_validation(Strictness::Lax));
        let (req, view) = post("42", br#"{"name": "x"}"#);
        let resp = v.handle(&req, &view, &AppContext::new(), create_item).unwrap();

        assert_eq!(resp.status, 200);
        assert_eq!(resp.content_type, "application/json");
        assert_eq!(resp.body_str(), r#"{"id":42,"name":"x"}"#);
    }

    #[test]
    fn test_end_to_end_pretty_in_debug() {
        let v = validator(ValidateOptions::default());
        let (req, view) = post("42", br#"{"name": "x"}"#);
        let ctx = AppContext::new().debug(true);
        let resp = v.handle(&req, &view, &ctx, create_item).unwrap();

        assert_eq!(resp.status, 200);
        assert!(resp.body_str().contains('\n'));
    }

    #[test]
    fn test_end_to_end_invalid_path_param() {
        let v = validator(ValidateOptions::default());
        let (req, view) = post("abc", br#"{"name": "x"}"#);
        let resp = v.handle(&req, &view, &AppContext::new(), create_item).unwrap();

        assert_eq!(resp.status, 400);
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["error"], "ValidationError");
        assert_eq!(body["detail"]["key"], "id");
    }

    #[test]
    fn test_validation_status_option_422() {
        let v = validator(ValidateOptions::default().validation_status(422));
        let (req, view) = post("abc", br#"{"name": "x"}"#);
        let resp = v.handle(&req, &view, &AppContext::new(), create_item).unwrap();
        assert_eq!(resp.status, 422);
    }

    #[test]
    fn test_validation_exceptions_raise() {
        let v = validator(ValidateOptions::default());
        let (req, view) = post("abc", br#"{"name": "x"}"#);
        let ctx = AppContext::new().validation_exceptions(true);
        let err = v.handle(&req, &view, &ctx, create_item).unwrap_err();

        match err {
            Error::Validation {
                error, status_code, ..
            } => {
                assert_eq!(error, "ValidationError");
                assert_eq!(status_code, 400);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_handler_contract_violation_is_internal() {
        let v = validator(ValidateOptions::default().response_validation(Strictness::Strict));
        let (req, view) = post("42", br#"{"name": "x"}"#);
        let err = v
            .handle(&req, &view, &AppContext::new(), |_args| {
                Reply::of(&json!({"wrong": "shape"}))
            })
            .unwrap_err();
        assert!(matches!(err, Error::ResponseValidation { .. }));
    }

    #[test]
    fn test_reply_status_and_headers() {
        let v = validator(ValidateOptions::default());
        let (req, view) = post("42", br#"{"name": "x"}"#);
        let resp = v
            .handle(&req, &view, &AppContext::new(), |args| {
                Ok(create_item(args)?.with_status(201).with_header("location", "/items/42"))
            })
            .unwrap();

        assert_eq!(resp.status, 201);
        assert_eq!(
            resp.headers.get("location").map(String::as_str),
            Some("/items/42")
        );
    }

    #[test]
    fn test_installed_provider_controls_pretty_printing() {
        let v = validator(ValidateOptions::default());
        let (req, view) = post("42", br#"{"name": "x"}"#);
        let ctx = AppContext::new().with_codec(Arc::new(JsonProvider::new().compact(false)));
        let resp = v.handle(&req, &view, &ctx, create_item).unwrap();
        assert!(resp.body_str().contains('\n'));
    }

    #[test]
    fn test_query_and_path_precedence_end_to_end() {
        let schema = HandlerSchema::builder()
            .required("id", "int")
            .returns("int")
            .build(&registry())
            .unwrap();
        let v = Validator::new(schema);

        let req = Request::new(Method::Get, "/items/7?id=99".to_string(), HashMap::new(), None);
        let view = HashMap::from([("id".to_string(), "7".to_string())]);
        let resp = v
            .handle(&req, &view, &AppContext::new(), |args| {
                Reply::of(&args.get_int("id").unwrap_or_default())
            })
            .unwrap();
        assert_eq!(resp.body_str(), "7");
    }
}
