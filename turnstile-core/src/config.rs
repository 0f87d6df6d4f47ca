//! # Application Context
//!
//! Process-wide knobs the binding layer reads from the hosting
//! application: debug mode (drives pretty-printing), whether validation
//! failures raise instead of rendering a direct error response, and the
//! installed JSON codec.

use crate::provider::JsonCodec;
use std::sync::Arc;

/// Application context consulted on every request
///
/// The codec reference is read fresh per request; no locking is needed
/// since it is a plain read.
#[derive(Clone, Default)]
pub struct AppContext {
    /// Whether the hosting application runs in debug mode
    pub debug: bool,
    /// Raise validation failures as typed errors instead of returning a
    /// direct error response
    pub validation_exceptions: bool,
    codec: Option<Arc<dyn JsonCodec>>,
}

impl AppContext {
    /// Create a context with defaults (no debug, no exceptions, no codec)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable debug mode
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Enable or disable validation exceptions
    #[must_use]
    pub fn validation_exceptions(mut self, raise: bool) -> Self {
        self.validation_exceptions = raise;
        self
    }

    /// Install a JSON codec for the application
    #[must_use]
    pub fn with_codec(mut self, codec: Arc<dyn JsonCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// The installed codec, if any
    #[must_use]
    pub fn codec(&self) -> Option<&Arc<dyn JsonCodec>> {
        self.codec.as_ref()
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("debug", &self.debug)
            .field("validation_exceptions", &self.validation_exceptions)
            .field("codec_installed", &self.codec.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::JsonProvider;

    #[test]
    fn test_defaults() {
        let ctx = AppContext::new();
        assert!(!ctx.debug);
        assert!(!ctx.validation_exceptions);
        assert!(ctx.codec().is_none());
    }

    #[test]
    fn test_builder() {
        let ctx = AppContext::new()
            .debug(true)
            .validation_exceptions(true)
            .with_codec(Arc::new(JsonProvider::new()));
        assert!(ctx.debug);
        assert!(ctx.validation_exceptions);
        assert!(ctx.codec().is_some());
    }
}
