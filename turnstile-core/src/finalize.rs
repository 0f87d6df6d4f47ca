//! # Response Finalizer
//!
//! Turns a normalized [`Reply`] into the final framework response:
//! optionally validates the body against the declared response type,
//! encodes it through the active codec, merges reply headers, and applies
//! the status override without ever clobbering an error status.

use crate::config::AppContext;
use crate::error::{Error, Result};
use crate::provider::{JsonCodec, JsonProvider};
use crate::reply::Reply;
use crate::response::Response;
use crate::schema::HandlerSchema;
use crate::serializer::default_decode_hook;
use crate::validate::ValidateOptions;
use tracing::debug;

/// Finalize a handler reply into a response
///
/// # Errors
///
/// Returns [`Error::ResponseValidation`] when response validation is
/// configured on and the body violates the declared response type; this
/// is a server-side contract violation and is never rendered as a client
/// error. Encoding failures propagate as [`Error::Encode`].
pub fn finalize(
    reply: Reply,
    schema: &HandlerSchema,
    options: &ValidateOptions,
    ctx: &AppContext,
) -> Result<Response> {
    let (body, status, headers) = reply.into_parts();

    let encoded = match options.strict_response {
        Some(mode) => {
            let hook = ctx
                .codec()
                .map_or_else(default_decode_hook, |codec| codec.decode_hook());
            let validated = schema
                .response()
                .coerce(&body, mode, &hook)
                .map_err(|e| Error::ResponseValidation {
                    reason: e.to_string(),
                })?;
            match ctx.codec() {
                Some(codec) => codec.encode_field(&validated, ctx.debug)?,
                None => JsonProvider::new().encode_field(&validated, ctx.debug)?,
            }
        }
        None => match ctx.codec() {
            Some(codec) => codec.dumpb(&body, ctx.debug)?,
            None => JsonProvider::new().dumpb(&body, ctx.debug)?,
        },
    };

    let mut resp = Response::json(encoded).with_status(options.success_status);

    if let Some(headers) = headers {
        for (key, value) in &headers {
            resp.set_header(key, value);
        }
    }

    // Never clobber an error status with a caller-supplied success status.
    if let Some(status) = status {
        if resp.status != options.validation_status {
            resp.status = status;
        }
    }

    debug!(status = resp.status, "response finalized");
    Ok(resp)
}
