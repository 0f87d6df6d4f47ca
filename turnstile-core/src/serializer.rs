//! # Serialization Hooks
//!
//! Extension points letting the JSON codec handle values it has no native
//! representation for: filesystem paths become their string form, objects
//! exposing an HTML-rendering capability become their rendered string, and
//! everything else fails with an error naming the offending type.
//!
//! The free functions here are the process-wide default hook pair; the
//! [`JsonProvider`](crate::provider::JsonProvider) carries its own
//! (overridable) pair built from them.

use crate::error::{Error, Result};
use crate::types::{convert, FieldType, FieldValue, Strictness};
use serde_json::Value;
use std::sync::Arc;

/// Encode hook signature: substitute a natively encodable value
pub type EncodeHook = Arc<dyn Fn(&FieldValue) -> Result<Value> + Send + Sync>;

/// Decode hook signature: reconstruct a declared type from a primitive
pub type DecodeHook = Arc<dyn Fn(FieldType, &Value, Strictness) -> Result<FieldValue> + Send + Sync>;

/// A pre-rendered fragment of HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(pub String);

/// Capability for values that know how to render themselves as HTML
///
/// The encode hook turns such values into the string result of the
/// rendering, mirroring the `__html__` protocol of template engines.
pub trait ToMarkup {
    /// Render the value as an HTML fragment
    fn to_markup(&self) -> Markup;
}

impl ToMarkup for Markup {
    fn to_markup(&self) -> Markup {
        self.clone()
    }
}

/// Encode an HTML-renderable value into its native JSON substitute
pub fn markup_value<T: ToMarkup>(value: &T) -> Value {
    Value::String(value.to_markup().0)
}

/// Default encode hook
///
/// Maps a [`FieldValue`] onto a natively JSON-representable value.
/// Filesystem paths become their string form; composite values pass
/// through unchanged.
///
/// # Errors
///
/// Returns [`Error::UnsupportedEncode`] for a non-UTF-8 path and
/// [`Error::Encode`] for a non-finite float.
pub fn encode_field(value: &FieldValue) -> Result<Value> {
    match value {
        FieldValue::Str(s) => Ok(Value::String(s.clone())),
        FieldValue::Int(i) => Ok(Value::Number((*i).into())),
        FieldValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .ok_or_else(|| Error::Encode {
                reason: format!("float {f} has no JSON representation"),
            }),
        FieldValue::Bool(b) => Ok(Value::Bool(*b)),
        FieldValue::Path(p) => p
            .to_str()
            .map(|s| Value::String(s.to_string()))
            .ok_or_else(|| Error::UnsupportedEncode {
                type_name: "non-UTF-8 path".to_string(),
            }),
        FieldValue::Json(v) => Ok(v.clone()),
    }
}

/// Default decode hook
///
/// A value that already satisfies the target type passes through
/// unchanged; a path target is constructed from the value's string form;
/// scalar targets defer to the conversion routine in [`crate::types`].
///
/// # Errors
///
/// Returns [`Error::Coerce`] when the value cannot satisfy the target and
/// [`Error::UnsupportedDecode`] when the target cannot be built from the
/// value's class at all (e.g. a path from an object).
pub fn decode_field(target: FieldType, value: &Value, strictness: Strictness) -> Result<FieldValue> {
    if target == FieldType::Path {
        return match value {
            Value::String(s) => Ok(FieldValue::Path(std::path::PathBuf::from(s))),
            _ => Err(Error::UnsupportedDecode {
                type_name: target.type_name().to_string(),
            }),
        };
    }
    if matches!(value, Value::Object(_) | Value::Array(_) | Value::Null) {
        return Err(Error::UnsupportedDecode {
            type_name: target.type_name().to_string(),
        });
    }
    convert(value, target, strictness)
}

/// The process-wide default encode hook
#[must_use]
pub fn default_encode_hook() -> EncodeHook {
    Arc::new(encode_field)
}

/// The process-wide default decode hook
#[must_use]
pub fn default_decode_hook() -> DecodeHook {
    Arc::new(|target, value, strictness| decode_field(target, value, strictness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn test_encode_path_as_string() {
        let encoded = encode_field(&FieldValue::Path(PathBuf::from("/var/data"))).unwrap();
        assert_eq!(encoded, json!("/var/data"));
    }

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode_field(&FieldValue::Int(7)).unwrap(), json!(7));
        assert_eq!(encode_field(&FieldValue::Bool(true)).unwrap(), json!(true));
        assert_eq!(
            encode_field(&FieldValue::Str("x".into())).unwrap(),
            json!("x")
        );
    }

    #[test]
    fn test_encode_nan_fails() {
        let err = encode_field(&FieldValue::Float(f64::NAN)).unwrap_err();
        assert!(err.to_string().contains("JSON representation"));
    }

    #[test]
    fn test_decode_passthrough_for_satisfied_type() {
        let decoded = decode_field(FieldType::Int, &json!(42), Strictness::Strict).unwrap();
        assert_eq!(decoded, FieldValue::Int(42));
    }

    #[test]
    fn test_decode_path_from_string() {
        let decoded = decode_field(FieldType::Path, &json!("/tmp/x"), Strictness::Strict).unwrap();
        assert_eq!(decoded, FieldValue::Path(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn test_decode_unsupported_class() {
        let err = decode_field(FieldType::Int, &json!({"a": 1}), Strictness::Lax).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDecode { .. }));
    }

    #[test]
    fn test_roundtrip_path() {
        let original = FieldValue::Path(PathBuf::from("/srv/files/report.pdf"));
        let encoded = encode_field(&original).unwrap();
        let decoded = decode_field(FieldType::Path, &encoded, Strictness::Strict).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_roundtrip_native_values() {
        for (fv, ty) in [
            (FieldValue::Int(9), FieldType::Int),
            (FieldValue::Bool(false), FieldType::Bool),
            (FieldValue::Str("ok".into()), FieldType::Str),
        ] {
            let encoded = encode_field(&fv).unwrap();
            let decoded = decode_field(ty, &encoded, Strictness::Strict).unwrap();
            assert_eq!(decoded, fv);
        }
    }

    #[test]
    fn test_markup_renders_to_string() {
        struct Badge(&'static str);
        impl ToMarkup for Badge {
            fn to_markup(&self) -> Markup {
                Markup(format!("<span>{}</span>", self.0))
            }
        }

        assert_eq!(markup_value(&Badge("ok")), json!("<span>ok</span>"));
        assert_eq!(markup_value(&Markup("<b>hi</b>".into())), json!("<b>hi</b>"));
    }
}
