//! # JSON Provider
//!
//! The pluggable JSON capability an application installs for everything it
//! serializes or deserializes. An explicit trait replaces duck-typed
//! provider detection: the binding context either holds a codec or it does
//! not, and falls back to the process-wide default hooks when it does not.

use crate::error::{Error, Result};
use crate::json::{parse_json_bytes, to_json, to_json_pretty};
use crate::registry::TypeDecl;
use crate::serializer::{default_decode_hook, default_encode_hook, DecodeHook, EncodeHook};
use crate::types::{FieldValue, Strictness};
use serde_json::Value;

/// JSON encode/decode capability consumed by the host framework
pub trait JsonCodec: Send + Sync {
    /// Encode a value to JSON bytes, pretty-printed per the provider's
    /// compact flag and the application's debug mode
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if serialization fails.
    fn dumpb(&self, value: &Value, debug: bool) -> Result<Vec<u8>>;

    /// Encode a value to a JSON string
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if serialization fails.
    fn dumps(&self, value: &Value, debug: bool) -> Result<String> {
        String::from_utf8(self.dumpb(value, debug)?).map_err(|e| Error::Encode {
            reason: e.to_string(),
        })
    }

    /// Generic decode, yielding dynamically-typed structures
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if the payload is not valid JSON.
    fn loads(&self, data: &[u8]) -> Result<Value>;

    /// Typed decode: parse, then coerce against a declared type using this
    /// codec's decode hook
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for invalid JSON and the coercion failure
    /// for values that do not satisfy the declared type.
    fn loads_typed(
        &self,
        data: &[u8],
        decl: &TypeDecl,
        strictness: Strictness,
    ) -> Result<FieldValue>;

    /// Encode a coerced field value, applying the encode hook first
    ///
    /// # Errors
    ///
    /// Propagates encode-hook and serialization failures.
    fn encode_field(&self, value: &FieldValue, debug: bool) -> Result<Vec<u8>>;

    /// The decode hook this codec applies to typed loads
    fn decode_hook(&self) -> DecodeHook;
}

/// Default JSON provider
///
/// Owns an encode/decode hook pair (defaulting to the process-wide hooks
/// in [`crate::serializer`]) and a pretty-printing policy: output is
/// indented when `compact` is explicitly `false`, or when `compact` is
/// unset and the application runs in debug mode.
#[derive(Clone)]
pub struct JsonProvider {
    /// Pretty-printing override; `None` defers to the debug flag
    pub compact: Option<bool>,
    enc_hook: EncodeHook,
    dec_hook: DecodeHook,
}

impl Default for JsonProvider {
    fn default() -> Self {
        Self {
            compact: None,
            enc_hook: default_encode_hook(),
            dec_hook: default_decode_hook(),
        }
    }
}

impl JsonProvider {
    /// Create a provider with the default hooks
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the compact flag explicitly
    #[must_use]
    pub fn compact(mut self, compact: bool) -> Self {
        self.compact = Some(compact);
        self
    }

    /// Replace the encode/decode hook pair
    #[must_use]
    pub fn with_hooks(mut self, enc_hook: EncodeHook, dec_hook: DecodeHook) -> Self {
        self.enc_hook = enc_hook;
        self.dec_hook = dec_hook;
        self
    }

    fn pretty(&self, debug: bool) -> bool {
        match self.compact {
            Some(compact) => !compact,
            None => debug,
        }
    }
}

impl std::fmt::Debug for JsonProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonProvider")
            .field("compact", &self.compact)
            .finish_non_exhaustive()
    }
}

impl JsonCodec for JsonProvider {
    fn dumpb(&self, value: &Value, debug: bool) -> Result<Vec<u8>> {
        let encoded = if self.pretty(debug) {
            to_json_pretty(value)?
        } else {
            to_json(value)?
        };
        Ok(encoded.into_bytes())
    }

    fn loads(&self, data: &[u8]) -> Result<Value> {
        let mut bytes = data.to_vec();
        parse_json_bytes(&mut bytes)
    }

    fn loads_typed(
        &self,
        data: &[u8],
        decl: &TypeDecl,
        strictness: Strictness,
    ) -> Result<FieldValue> {
        let value = self.loads(data)?;
        decl.coerce(&value, strictness, &self.dec_hook)
    }

    fn encode_field(&self, value: &FieldValue, debug: bool) -> Result<Vec<u8>> {
        let native = (self.enc_hook)(value)?;
        self.dumpb(&native, debug)
    }

    fn decode_hook(&self) -> DecodeHook {
        self.dec_hook.clone()
    }
}
