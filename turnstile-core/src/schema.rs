//! # Handler Schema
//!
//! Explicit registration-time declaration of a handler's parameters and
//! response type. Replaces runtime signature reflection: a handler is
//! registered together with a schema naming each parameter and its type,
//! resolved once against a [`TypeRegistry`] and cached for the process
//! lifetime.
//!
//! ## Design Principles
//!
//! - **S**: Only holds parameter/response declarations
//! - **O**: New types extend the registry, not the schema
//! - **D**: Resolution goes through the registry abstraction

use crate::error::{Error, Result};
use crate::registry::{TypeDecl, TypeRegistry};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved parameter name bound from the request entity body
pub const BODY_PARAM: &str = "body";

/// A declared parameter: resolved type plus optional default
///
/// Built once per handler at registration time; immutable thereafter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Resolved type declaration
    pub decl: TypeDecl,
    /// Default value, `None` meaning "no default"
    pub default: Option<Value>,
}

/// Resolved schema for one handler
///
/// Holds the response type declaration and the name→spec parameter map.
#[derive(Debug, Clone)]
pub struct HandlerSchema {
    response: TypeDecl,
    params: BTreeMap<String, ParamSpec>,
}

impl HandlerSchema {
    /// Start building a schema
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// The declared response type
    #[must_use]
    pub fn response(&self) -> &TypeDecl {
        &self.response
    }

    /// The declared parameters, keyed by name
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, ParamSpec> {
        &self.params
    }

    /// Look up a declared parameter
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.get(name)
    }

    /// Whether a body parameter is declared
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.params.contains_key(BODY_PARAM)
    }
}

/// Builder for [`HandlerSchema`]
///
/// All configuration errors surface in [`SchemaBuilder::build`], which is
/// the registration-time analogue of failing at decoration time.
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    params: Vec<(String, String, Option<Value>)>,
    returns: Option<String>,
}

impl SchemaBuilder {
    /// Declare a required parameter with the given type name
    #[must_use]
    pub fn required(mut self, name: &str, type_name: &str) -> Self {
        self.params
            .push((name.to_string(), type_name.to_string(), None));
        self
    }

    /// Declare an optional parameter with a default value
    #[must_use]
    pub fn optional(mut self, name: &str, type_name: &str, default: Value) -> Self {
        self.params
            .push((name.to_string(), type_name.to_string(), Some(default)));
        self
    }

    /// Declare the body parameter with the given type name
    ///
    /// Equivalent to `required("body", type_name)`; at most one body
    /// parameter exists since parameters are keyed by name.
    #[must_use]
    pub fn body(self, type_name: &str) -> Self {
        self.required(BODY_PARAM, type_name)
    }

    /// Declare the response type
    #[must_use]
    pub fn returns(mut self, type_name: &str) -> Self {
        self.returns = Some(type_name.to_string());
        self
    }

    /// Resolve every declared name against the registry
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownType`] naming the offending parameter when
    /// a type name does not resolve, and [`Error::MissingResponseType`]
    /// when no response type was declared. Both are fatal configuration
    /// errors for application startup.
    pub fn build(self, registry: &TypeRegistry) -> Result<HandlerSchema> {
        let response_name = self.returns.ok_or(Error::MissingResponseType)?;
        let response = registry.resolve_for(&response_name, "return")?;

        let mut params = BTreeMap::new();
        for (name, type_name, default) in self.params {
            let decl = registry.resolve_for(&type_name, &name)?;
            params.insert(name, ParamSpec { decl, default });
        }

        Ok(HandlerSchema { response, params })
    }
}
