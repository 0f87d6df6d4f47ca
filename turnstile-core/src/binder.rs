//! # Request Binder
//!
//! Per-request binding of query parameters, path parameters and the body
//! payload into a handler's declared types. Step order is load-bearing:
//! query values fill the argument map first, the missing check runs, query
//! values are converted in place, path values are converted after (so a
//! same-named path segment overwrites a query value), and the body is
//! bound last under the reserved `body` key.
//!
//! The first conversion failure short-circuits all later steps and yields
//! a [`Rejection`] naming the offending key, either returned for direct
//! rendering or raised as [`Error::Validation`] when the application
//! context enables validation exceptions.

use crate::config::AppContext;
use crate::error::{Error, Result};
use crate::json::parse_json;
use crate::request::Request;
use crate::schema::{HandlerSchema, ParamSpec, BODY_PARAM};
use crate::serializer::{default_decode_hook, DecodeHook};
use crate::types::{FieldValue, Strictness};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Offending key and message of a validation failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Name of the parameter that failed
    pub key: String,
    /// Underlying validation message
    pub msg: String,
}

/// Structured validation error response body
///
/// Serializes bit-exact as
/// `{"error": "<kind>", "detail": {"key": ..., "msg": ...} | null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// Error kind name, e.g. `ValidationError`
    pub error: String,
    /// Offending key and message, when known
    pub detail: Option<ErrorDetail>,
}

impl Rejection {
    /// A validation rejection for the given key and message
    #[must_use]
    pub fn validation(key: &str, msg: impl Into<String>) -> Self {
        Self {
            error: "ValidationError".to_string(),
            detail: Some(ErrorDetail {
                key: key.to_string(),
                msg: msg.into(),
            }),
        }
    }

    /// A rejection carrying the kind name of the underlying failure
    #[must_use]
    pub fn from_error(key: &str, err: &Error) -> Self {
        let kind = match err {
            Error::Decode { .. } => "DecodeError",
            _ => "ValidationError",
        };
        Self {
            error: kind.to_string(),
            detail: Some(ErrorDetail {
                key: key.to_string(),
                msg: err.to_string(),
            }),
        }
    }

    /// The rejection as a JSON value
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Null)
    }
}

/// Bound, fully-coerced handler arguments
#[derive(Debug, Clone, Default)]
pub struct Args {
    values: BTreeMap<String, FieldValue>,
}

impl Args {
    /// Get a bound value by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Get a parameter as i64
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.values.get(name).and_then(FieldValue::as_int)
    }

    /// Get a parameter as f64
    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(FieldValue::as_float)
    }

    /// Get a parameter as bool
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(FieldValue::as_bool)
    }

    /// Get a parameter as &str
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(FieldValue::as_str)
    }

    /// Get a parameter as a filesystem path
    #[must_use]
    pub fn get_path(&self, name: &str) -> Option<&std::path::Path> {
        self.values.get(name).and_then(FieldValue::as_path)
    }

    /// The coerced body payload as a JSON value
    #[must_use]
    pub fn body_json(&self) -> Option<&Value> {
        self.values.get(BODY_PARAM).and_then(FieldValue::as_json)
    }

    /// Deserialize the coerced body payload into `T`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the (already schema-coerced) body does
    /// not deserialize into `T`.
    pub fn body<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.body_json().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(value)?)
    }

    /// Number of bound arguments
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if no arguments are bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Outcome of binding a request against a schema
#[derive(Debug)]
pub enum BindOutcome {
    /// All parameters bound and coerced
    Bound(Args),
    /// Validation failed; render this rejection directly
    Rejected(Rejection),
}

/// Per-entry state of the argument value map
#[derive(Debug, Clone)]
enum Slot {
    /// "No value supplied" sentinel
    Missing,
    /// Raw, not yet coerced value
    Raw(Value),
    /// Coerced value
    Typed(FieldValue),
}

/// Bind a request's query, path and body values against a handler schema
///
/// `view_args` is the name→value mapping the host router extracted from
/// the URL path template. View args not declared in the schema are
/// ignored.
///
/// # Errors
///
/// Returns [`Error::Validation`] instead of a [`BindOutcome::Rejected`]
/// when the context enables validation exceptions; the error carries the
/// identical kind and detail with `status_code == 400`.
pub fn bind(
    schema: &HandlerSchema,
    req: &Request,
    view_args: &HashMap<String, String>,
    ctx: &AppContext,
) -> Result<BindOutcome> {
    match bind_inner(schema, req, view_args, ctx) {
        Ok(args) => {
            debug!(params = args.len(), path = %req.path, "request bound");
            Ok(BindOutcome::Bound(args))
        }
        Err(rejection) => {
            warn!(
                path = %req.path,
                error = %rejection.error,
                key = rejection.detail.as_ref().map(|d| d.key.as_str()).unwrap_or("-"),
                "validation failed"
            );
            if ctx.validation_exceptions {
                return Err(Error::Validation {
                    error: rejection.error.clone(),
                    status_code: 400,
                    detail: rejection.detail,
                });
            }
            Ok(BindOutcome::Rejected(rejection))
        }
    }
}

fn bind_inner(
    schema: &HandlerSchema,
    req: &Request,
    view_args: &HashMap<String, String>,
    ctx: &AppContext,
) -> std::result::Result<Args, Rejection> {
    let hook = ctx
        .codec()
        .map_or_else(default_decode_hook, |codec| codec.decode_hook());

    // Seed from router-supplied view args, declared names only.
    let mut map: BTreeMap<String, Slot> = BTreeMap::new();
    for (name, value) in view_args {
        if schema.param(name).is_some() {
            map.insert(name.clone(), Slot::Raw(Value::String(value.clone())));
        } else {
            debug!(param = %name, "ignoring undeclared view arg");
        }
    }

    // Fill names absent from the map: raw query value, else the declared
    // default, else the missing sentinel.
    for (name, spec) in schema.params() {
        if map.contains_key(name) {
            continue;
        }
        let slot = match req.query_first(name) {
            Some(raw) => Slot::Raw(Value::String(raw.to_string())),
            None => spec
                .default
                .clone()
                .map_or(Slot::Missing, Slot::Raw),
        };
        map.insert(name.clone(), slot);
    }

    // Missing check over everything except the body.
    for (name, slot) in &map {
        if name == BODY_PARAM {
            continue;
        }
        if matches!(slot, Slot::Missing) {
            return Err(Rejection::validation(name, "Missing parameter"));
        }
    }

    // Convert query-sourced values in place.
    let mut seen = std::collections::HashSet::new();
    for (key, value) in req.query_pairs() {
        if !seen.insert(key.as_str()) {
            continue;
        }
        let Some(spec) = schema.param(key) else {
            continue;
        };
        if !map.contains_key(key) {
            continue;
        }
        let coerced = coerce(spec, &Value::String(value.clone()), &hook)
            .map_err(|e| Rejection::from_error(key, &e))?;
        map.insert(key.clone(), Slot::Typed(coerced));
    }

    // Convert path values after query values so the path wins.
    for (name, value) in view_args {
        let Some(spec) = schema.param(name) else {
            continue;
        };
        let coerced = coerce(spec, &Value::String(value.clone()), &hook)
            .map_err(|e| Rejection::from_error(name, &e))?;
        map.insert(name.clone(), Slot::Typed(coerced));
    }

    // Bind the body last, when declared.
    if let Some(spec) = schema.param(BODY_PARAM) {
        let coerced = bind_body(spec, req, ctx, &hook)
            .map_err(|e| Rejection::from_error(BODY_PARAM, &e))?;
        map.insert(BODY_PARAM.to_string(), Slot::Typed(coerced));
    }

    // Collapse: coerce default-sourced values that no step touched.
    let mut values = BTreeMap::new();
    for (name, slot) in map {
        let value = match slot {
            Slot::Typed(v) => v,
            Slot::Raw(raw) => {
                let spec = schema
                    .param(&name)
                    .ok_or_else(|| Rejection::validation(&name, "Missing parameter"))?;
                coerce(spec, &raw, &hook).map_err(|e| Rejection::from_error(&name, &e))?
            }
            Slot::Missing => return Err(Rejection::validation(&name, "Missing parameter")),
        };
        values.insert(name, value);
    }

    Ok(Args { values })
}

fn coerce(spec: &ParamSpec, value: &Value, hook: &DecodeHook) -> Result<FieldValue> {
    spec.decl.coerce(value, Strictness::Lax, hook)
}

/// Convert the request payload into the body's declared type
///
/// Raw bytes go through the installed codec's typed-load path when one is
/// installed, otherwise through the direct parse-then-coerce routine.
/// Without raw bytes, the form-encoded fields (possibly empty) are
/// converted as a multi-valued mapping.
fn bind_body(
    spec: &ParamSpec,
    req: &Request,
    ctx: &AppContext,
    hook: &DecodeHook,
) -> Result<FieldValue> {
    if let Some(bytes) = req.body_bytes() {
        if let Some(codec) = ctx.codec() {
            return codec.loads_typed(bytes, &spec.decl, Strictness::Lax);
        }
        let value: Value = parse_json(std::str::from_utf8(bytes).map_err(|e| Error::Decode {
            reason: e.to_string(),
        })?)?;
        return spec.decl.coerce(&value, Strictness::Lax, hook);
    }

    let fields = req.form_fields();
    let form: Value = Value::Object(
        fields
            .into_iter()
            .map(|(k, vs)| (k, Value::Array(vs.into_iter().map(Value::String).collect())))
            .collect(),
    );
    spec.decl.coerce(&form, Strictness::Lax, hook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::JsonProvider;
    use crate::registry::TypeRegistry;
    use crate::request::Method;
    use crate::schema::HandlerSchema;
    use hyper::body::Bytes;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct CreateItem {
        name: String,
    }

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::with_builtins();
        registry.register_struct::<CreateItem>("CreateItem");
        registry
    }

    fn schema() -> HandlerSchema {
        HandlerSchema::builder()
            .required("id", "int")
            .optional("limit", "int", json!(10))
            .returns("int")
            .build(&registry())
            .unwrap()
    }

    fn get(path: &str) -> Request {
        Request::new(Method::Get, path.to_string(), HashMap::new(), None)
    }

    fn view(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn expect_args(outcome: Result<BindOutcome>) -> Args {
        match outcome.unwrap() {
            BindOutcome::Bound(args) => args,
            BindOutcome::Rejected(r) => panic!("unexpected rejection: {r:?}"),
        }
    }

    fn expect_rejection(outcome: Result<BindOutcome>) -> Rejection {
        match outcome.unwrap() {
            BindOutcome::Rejected(r) => r,
            BindOutcome::Bound(_) => panic!("expected rejection"),
        }
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("turnstile_core=debug")
            .try_init();
    }

    #[test]
    fn test_bind_path_and_default() {
        init_tracing();
        let args = expect_args(bind(
            &schema(),
            &get("/items/42"),
            &view(&[("id", "42")]),
            &AppContext::new(),
        ));
        assert_eq!(args.get_int("id"), Some(42));
        assert_eq!(args.get_int("limit"), Some(10));
    }

    #[test]
    fn test_bind_query_value() {
        let args = expect_args(bind(
            &schema(),
            &get("/items/7?limit=25"),
            &view(&[("id", "7")]),
            &AppContext::new(),
        ));
        assert_eq!(args.get_int("limit"), Some(25));
    }

    #[test]
    fn test_path_overwrites_query() {
        // Same-named key in both sources: the path value must win.
        let args = expect_args(bind(
            &schema(),
            &get("/items/7?id=99"),
            &view(&[("id", "7")]),
            &AppContext::new(),
        ));
        assert_eq!(args.get_int("id"), Some(7));
    }

    #[test]
    fn test_missing_required_parameter() {
        let rejection = expect_rejection(bind(
            &schema(),
            &get("/items"),
            &HashMap::new(),
            &AppContext::new(),
        ));
        assert_eq!(rejection.error, "ValidationError");
        let detail = rejection.detail.unwrap();
        assert_eq!(detail.key, "id");
        assert_eq!(detail.msg, "Missing parameter");
    }

    #[test]
    fn test_invalid_query_value_names_key() {
        let rejection = expect_rejection(bind(
            &schema(),
            &get("/items/1?limit=lots"),
            &view(&[("id", "1")]),
            &AppContext::new(),
        ));
        assert_eq!(rejection.detail.unwrap().key, "limit");
    }

    #[test]
    fn test_invalid_path_value_names_key() {
        let rejection = expect_rejection(bind(
            &schema(),
            &get("/items/abc"),
            &view(&[("id", "abc")]),
            &AppContext::new(),
        ));
        assert_eq!(rejection.detail.unwrap().key, "id");
    }

    #[test]
    fn test_validation_exceptions_raise_with_same_detail() {
        let ctx = AppContext::new().validation_exceptions(true);
        let err = bind(&schema(), &get("/items"), &HashMap::new(), &ctx).unwrap_err();
        match err {
            Error::Validation {
                error,
                status_code,
                detail,
            } => {
                assert_eq!(error, "ValidationError");
                assert_eq!(status_code, 400);
                let detail = detail.unwrap();
                assert_eq!(detail.key, "id");
                assert_eq!(detail.msg, "Missing parameter");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn body_schema() -> HandlerSchema {
        HandlerSchema::builder()
            .required("id", "int")
            .body("CreateItem")
            .returns("CreateItem")
            .build(&registry())
            .unwrap()
    }

    #[test]
    fn test_bind_json_body() {
        let req = Request::new(
            Method::Post,
            "/items/5".to_string(),
            HashMap::new(),
            Some(Bytes::from_static(br#"{"name": "x"}"#)),
        );
        let args = expect_args(bind(
            &body_schema(),
            &req,
            &view(&[("id", "5")]),
            &AppContext::new(),
        ));
        assert_eq!(args.body_json(), Some(&json!({"name": "x"})));
        assert_eq!(args.body::<CreateItem>().unwrap().name, "x");
    }

    #[test]
    fn test_bind_json_body_through_installed_codec() {
        let ctx = AppContext::new().with_codec(Arc::new(JsonProvider::new()));
        let req = Request::new(
            Method::Post,
            "/items/5".to_string(),
            HashMap::new(),
            Some(Bytes::from_static(br#"{"name": "y"}"#)),
        );
        let args = expect_args(bind(&body_schema(), &req, &view(&[("id", "5")]), &ctx));
        assert_eq!(args.body::<CreateItem>().unwrap().name, "y");
    }

    #[test]
    fn test_invalid_body_names_body_key() {
        let req = Request::new(
            Method::Post,
            "/items/5".to_string(),
            HashMap::new(),
            Some(Bytes::from_static(br#"{"name": 5}"#)),
        );
        let rejection = expect_rejection(bind(
            &body_schema(),
            &req,
            &view(&[("id", "5")]),
            &AppContext::new(),
        ));
        assert_eq!(rejection.detail.unwrap().key, "body");
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let req = Request::new(
            Method::Post,
            "/items/5".to_string(),
            HashMap::new(),
            Some(Bytes::from_static(b"{not json")),
        );
        let rejection = expect_rejection(bind(
            &body_schema(),
            &req,
            &view(&[("id", "5")]),
            &AppContext::new(),
        ));
        assert_eq!(rejection.error, "DecodeError");
    }

    #[test]
    fn test_empty_body_converts_empty_form_mapping() {
        // No raw body, no form fields: binding still attempts conversion
        // of the empty mapping, which CreateItem rejects (missing field).
        let req = Request::new(Method::Post, "/items/5".to_string(), HashMap::new(), None);
        let rejection = expect_rejection(bind(
            &body_schema(),
            &req,
            &view(&[("id", "5")]),
            &AppContext::new(),
        ));
        let detail = rejection.detail.unwrap();
        assert_eq!(detail.key, "body");
        assert!(detail.msg.contains("name"));
    }

    #[test]
    fn test_rejection_wire_shape() {
        let rejection = Rejection::validation("id", "Missing parameter");
        assert_eq!(
            serde_json::to_string(&rejection).unwrap(),
            r#"{"error":"ValidationError","detail":{"key":"id","msg":"Missing parameter"}}"#
        );

        let bare = Rejection {
            error: "ValidationError".to_string(),
            detail: None,
        };
        assert_eq!(
            serde_json::to_string(&bare).unwrap(),
            r#"{"error":"ValidationError","detail":null}"#
        );
    }
}
