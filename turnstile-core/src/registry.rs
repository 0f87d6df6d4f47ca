//! # Type Registry
//!
//! Explicit, passed-in registry mapping type names to coercion routines.
//! Handler schemas resolve their declared type names against a registry at
//! registration time, so binding carries no hidden global state.
//!
//! ## Design Principles
//!
//! - **S**: Only maps names to type declarations
//! - **O**: Extensible via `register_struct` / `register_custom`
//! - **D**: The schema depends on `resolve`, not concrete types

use crate::error::{Error, Result};
use crate::serializer::DecodeHook;
use crate::types::{FieldType, FieldValue, Strictness};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Coercion routine for a registered composite type
pub type Coercer = Arc<dyn Fn(&Value, Strictness) -> Result<FieldValue> + Send + Sync>;

/// A resolved type declaration
///
/// Field declarations coerce through the currently active decode hook;
/// custom declarations carry their own coercion routine.
#[derive(Clone)]
pub enum TypeDecl {
    /// A built-in scalar or path type
    Field {
        /// Registered name
        name: String,
        /// The field type to coerce to
        ty: FieldType,
    },
    /// A registry-supplied composite type
    Custom {
        /// Registered name
        name: String,
        /// The coercion routine
        coerce: Coercer,
    },
}

impl TypeDecl {
    /// The registered name of this type
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name, .. } | Self::Custom { name, .. } => name,
        }
    }

    /// Coerce a value to this type using the given decode hook
    ///
    /// # Errors
    ///
    /// Propagates the hook's or the custom routine's coercion failure.
    pub fn coerce(
        &self,
        value: &Value,
        strictness: Strictness,
        hook: &DecodeHook,
    ) -> Result<FieldValue> {
        match self {
            Self::Field { ty, .. } => hook(*ty, value, strictness),
            Self::Custom { coerce, .. } => coerce(value, strictness),
        }
    }
}

impl fmt::Debug for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { name, ty } => f
                .debug_struct("TypeDecl::Field")
                .field("name", name)
                .field("ty", ty)
                .finish(),
            Self::Custom { name, .. } => f
                .debug_struct("TypeDecl::Custom")
                .field("name", name)
                .finish_non_exhaustive(),
        }
    }
}

/// Registry of resolvable type names
///
/// Effectively write-once per type at startup, read-many afterwards.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    decls: HashMap<String, TypeDecl>,
}

impl TypeRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in types
    /// (`string`, `int`, `float`, `bool`, `path`)
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for ty in [
            FieldType::Str,
            FieldType::Int,
            FieldType::Float,
            FieldType::Bool,
            FieldType::Path,
        ] {
            registry.register_field(ty.type_name(), ty);
        }
        registry
    }

    /// Register a built-in field type under a name
    pub fn register_field(&mut self, name: &str, ty: FieldType) {
        self.decls.insert(
            name.to_string(),
            TypeDecl::Field {
                name: name.to_string(),
                ty,
            },
        );
    }

    /// Register a composite type backed by a serde round-trip through `T`
    ///
    /// Coercion deserializes the value into `T` (validating shape and
    /// field types) and re-serializes it into its canonical JSON form.
    pub fn register_struct<T>(&mut self, name: &str)
    where
        T: Serialize + DeserializeOwned + 'static,
    {
        let type_name = name.to_string();
        let coerce: Coercer = Arc::new(move |value, _strictness| {
            let typed: T = serde_json::from_value(value.clone()).map_err(|e| Error::Coerce {
                expected: type_name.clone(),
                value: value.to_string(),
                reason: e.to_string(),
            })?;
            Ok(FieldValue::Json(serde_json::to_value(typed)?))
        });
        self.register_custom(name, coerce);
    }

    /// Register a composite type with a hand-written coercion routine
    pub fn register_custom(&mut self, name: &str, coerce: Coercer) {
        self.decls.insert(
            name.to_string(),
            TypeDecl::Custom {
                name: name.to_string(),
                coerce,
            },
        );
    }

    /// Resolve a type name to its declaration
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&TypeDecl> {
        self.decls.get(name)
    }

    /// Resolve a type name, failing with a configuration error naming the
    /// parameter that declared it
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] when the name is not registered.
    pub fn resolve_for(&self, name: &str, param: &str) -> Result<TypeDecl> {
        self.resolve(name).cloned().ok_or_else(|| Error::UnknownType {
            type_name: name.to_string(),
            param: param.to_string(),
        })
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.decls.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
