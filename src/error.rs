//! Error bookkeeping types.
//!
//! Two kinds of error live here, and they never interrupt control flow on
//! their own:
//!
//! - [`ErrorEntry`] - an application error recorded on a [`Context`] via
//!   [`Context::error`] or [`Context::fail`], kept in an ordered list for a
//!   later middleware (typically a logger) to inspect
//! - [`RenderError`] - the failure taxonomy of the response serialization
//!   helpers; the context converts these into a recorded entry plus a 500
//!   response rather than propagating them
//!
//! [`Context`]: crate::Context
//! [`Context::error`]: crate::Context::error
//! [`Context::fail`]: crate::Context::fail

use serde::Serialize;

/// An error recorded during the handling of one request.
///
/// Entries accumulate in registration order on the request's
/// [`Context`](crate::Context) and are never surfaced to the client
/// automatically; rendering or logging them is a middleware's job. The
/// serialized form uses `msg` for the message field.
///
/// # Example
///
/// ```rust
/// use gantry::{Context, Engine};
///
/// let mut app = Engine::new();
/// app.get("/", |ctx: &mut Context| {
///     ctx.error("upstream lookup failed", serde_json::json!({"host": "db-1"}));
///     ctx.string(200, "degraded");
/// });
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEntry {
    /// Human-readable description of the error.
    #[serde(rename = "msg")]
    pub message: String,
    /// Arbitrary data attached when the error was recorded.
    pub meta: serde_json::Value,
}

/// Failure cases of the response serialization helpers.
///
/// The [`Context`](crate::Context) render methods recover from these locally:
/// the error is recorded as an [`ErrorEntry`] and the response is replaced by
/// a 500 carrying the error text. This type is public so that middleware
/// matching on recorded messages knows the vocabulary.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// JSON encoding of the response value failed.
    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    /// XML encoding of the response value failed.
    #[cfg(feature = "xml")]
    #[error("xml encoding failed: {0}")]
    Xml(#[from] quick_xml::SeError),

    /// The named template failed to render, or the data could not be
    /// converted into a template context.
    #[cfg(feature = "templates")]
    #[error("template rendering failed: {0}")]
    Template(#[from] tera::Error),

    /// No template store has been loaded on the engine.
    #[cfg(feature = "templates")]
    #[error("no templates loaded; call Engine::load_templates during setup")]
    TemplatesNotLoaded,
}
