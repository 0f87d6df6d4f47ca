//! # Field Types and Coercion
//!
//! Declared types for bound request values and the strict/lax conversion
//! routine that coerces loosely-typed input (query strings, parsed JSON
//! primitives) into them.
//!
//! ## Design Principles
//!
//! - **S**: Single responsibility - each kind has one conversion rule
//! - **O**: Composite types extend the system via the registry, not here
//! - **D**: The binder depends on `convert`, not concrete parsing logic

use crate::error::{Error, Result};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Conversion mode for coercion.
///
/// `Strict` performs no implicit widening: a JSON string is never an int.
/// `Lax` additionally parses strings into scalars and accepts common
/// boolean spellings, which is what query and path parameters need since
/// they always arrive as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// No implicit widening
    Strict,
    /// Permissive string-to-scalar parsing
    #[default]
    Lax,
}

/// Supported field types for declared parameters
///
/// Used during handler registration to specify expected types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FieldType {
    /// String type - no conversion
    #[default]
    Str,
    /// Integer type - coerces to i64
    Int,
    /// Float type - coerces to f64
    Float,
    /// Boolean type
    Bool,
    /// Filesystem path type - constructed from its string form
    Path,
}

impl FieldType {
    /// Parse a type specifier used in schema declarations (e.g. `"int"`)
    #[must_use]
    pub fn from_specifier(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Some(Self::Str),
            "int" | "integer" | "i64" => Some(Self::Int),
            "float" | "f64" | "number" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            "path" => Some(Self::Path),
            _ => None,
        }
    }

    /// Get the type name for error messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Path => "path",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Coerced field value
///
/// Holds the actual typed value after conversion. `Json` carries composite
/// values produced by registry-resolved struct types.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// String value
    Str(String),
    /// Integer value (i64)
    Int(i64),
    /// Float value (f64)
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Filesystem path value
    Path(PathBuf),
    /// Composite JSON value (struct types)
    Json(Value),
}

impl FieldValue {
    /// Name of the value's runtime kind, for error messages
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Bool(_) => "bool",
            Self::Path(_) => "path",
            Self::Json(_) => "json",
        }
    }

    /// Get as &str if Str variant
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as i64 if Int variant
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64 if Float variant
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as bool if Bool variant
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as &Path if Path variant
    #[must_use]
    pub fn as_path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    /// Get as &Value if Json variant
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            _ => None,
        }
    }
}

fn coerce_err(expected: FieldType, value: &Value, reason: impl Into<String>) -> Error {
    Error::Coerce {
        expected: expected.type_name().to_string(),
        value: display_value(value),
        reason: reason.into(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Convert a loosely-typed JSON value to a typed field value
///
/// This is the core conversion routine. All scalar coercion logic is
/// centralized here; composite types go through the registry instead.
///
/// # Errors
///
/// Returns [`Error::Coerce`] if the value does not satisfy the declared
/// type under the given strictness.
pub fn convert(value: &Value, ty: FieldType, strictness: Strictness) -> Result<FieldValue> {
    match ty {
        FieldType::Str => match value {
            Value::String(s) => Ok(FieldValue::Str(s.clone())),
            other => Err(coerce_err(ty, other, "expected a string")),
        },
        FieldType::Int => convert_int(value, strictness),
        FieldType::Float => convert_float(value, strictness),
        FieldType::Bool => convert_bool(value, strictness),
        FieldType::Path => match value {
            Value::String(s) => Ok(FieldValue::Path(PathBuf::from(s))),
            other => Err(coerce_err(ty, other, "expected a path string")),
        },
    }
}

fn convert_int(value: &Value, strictness: Strictness) -> Result<FieldValue> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Ok(FieldValue::Int(i));
            }
            // Integral floats are accepted in lax mode only
            if strictness == Strictness::Lax {
                if let Some(f) = n.as_f64() {
                    if f.fract() == 0.0 {
                        #[allow(clippy::cast_possible_truncation)]
                        return Ok(FieldValue::Int(f as i64));
                    }
                }
            }
            Err(coerce_err(FieldType::Int, value, "number is not an integer"))
        }
        Value::String(s) if strictness == Strictness::Lax => s
            .trim()
            .parse::<i64>()
            .map(FieldValue::Int)
            .map_err(|e| coerce_err(FieldType::Int, value, e.to_string())),
        other => Err(coerce_err(FieldType::Int, other, "expected an integer")),
    }
}

fn convert_float(value: &Value, strictness: Strictness) -> Result<FieldValue> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| coerce_err(FieldType::Float, value, "number out of range")),
        Value::String(s) if strictness == Strictness::Lax => s
            .trim()
            .parse::<f64>()
            .map(FieldValue::Float)
            .map_err(|e| coerce_err(FieldType::Float, value, e.to_string())),
        other => Err(coerce_err(FieldType::Float, other, "expected a number")),
    }
}

fn convert_bool(value: &Value, strictness: Strictness) -> Result<FieldValue> {
    match value {
        Value::Bool(b) => Ok(FieldValue::Bool(*b)),
        Value::String(s) if strictness == Strictness::Lax => {
            match s.to_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(FieldValue::Bool(true)),
                "false" | "0" | "no" => Ok(FieldValue::Bool(false)),
                _ => Err(coerce_err(FieldType::Bool, value, "not a boolean spelling")),
            }
        }
        Value::Number(n) if strictness == Strictness::Lax => match n.as_i64() {
            Some(0) => Ok(FieldValue::Bool(false)),
            Some(1) => Ok(FieldValue::Bool(true)),
            _ => Err(coerce_err(FieldType::Bool, value, "expected 0 or 1")),
        },
        other => Err(coerce_err(FieldType::Bool, other, "expected a boolean")),
    }
}
