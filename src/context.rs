//! Per-request context and chain execution.
//!
//! A [`Context`] is created for exactly one inbound request, bound to the
//! handler chain the router resolved for it. It exposes everything a handler
//! needs: the request, the response under construction, matched path
//! parameters, a per-request key/value store, an error list, and the
//! [`next`](Context::next) / [`abort`](Context::abort) operations that drive
//! and short-circuit the chain. The context is discarded when the chain
//! finishes; it has no existence beyond one request.
//!
//! # Execution model
//!
//! Handlers in a chain run strictly in order. A middleware that wants
//! "before and after" behavior calls `next()` in its body; everything
//! downstream runs to completion before `next()` returns:
//!
//! ```rust
//! use gantry::{handlers, Context, Engine, Method};
//!
//! let mut app = Engine::new();
//! app.handle(Method::GET, "/", handlers![
//!     |ctx: &mut Context| {
//!         // before downstream
//!         ctx.next();
//!         // after downstream: the response is complete here
//!         let status = ctx.response().status();
//!         log::info!("-> {status}");
//!     },
//!     |ctx: &mut Context| ctx.string(200, "ok"),
//! ]);
//! ```
//!
//! Execution is synchronous and cooperative: the framework never runs two
//! handlers of the same request concurrently, and there is no cancellation -
//! a chain always runs to completion or abort.

use crate::{
    error::{ErrorEntry, RenderError},
    handler::{AnyHandler, Handler},
    Engine, Request, Response,
};
use core::{any::type_name, fmt};
use http::{header, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use std::{any::Any, collections::HashMap, sync::Arc};

/// Path parameters extracted by the router, in pattern order.
///
/// A route registered as `/users/:id` matched against `/users/42` yields one
/// pair `("id", "42")`. Values are always the raw matched path segment.
#[derive(Debug, Clone, Default)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub(crate) fn new(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }

    /// Returns the value captured under `name`, if the pattern has such a
    /// parameter.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Returns the number of captured parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no parameters were captured.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The per-request state passed to every handler in a chain.
///
/// See the [module docs](self) for the execution model. Beyond chain control,
/// the context offers:
///
/// - request/response access ([`request`](Self::request),
///   [`response_mut`](Self::response_mut), ...)
/// - path parameters ([`param`](Self::param))
/// - a lazily allocated key/value store ([`set`](Self::set),
///   [`get`](Self::get), [`must_get`](Self::must_get))
/// - error collection ([`error`](Self::error), [`errors`](Self::errors))
/// - response serialization ([`json`](Self::json), [`string`](Self::string),
///   ...)
pub struct Context<'e> {
    engine: &'e Engine,
    request: Request,
    response: Response,
    params: Params,
    keys: Option<HashMap<String, Box<dyn Any + Send + Sync>>>,
    errors: Vec<ErrorEntry>,
    chain: Arc<[AnyHandler]>,
    index: usize,
    aborted: bool,
}

impl<'e> Context<'e> {
    pub(crate) fn new(
        engine: &'e Engine,
        request: Request,
        response: Response,
        chain: Arc<[AnyHandler]>,
        params: Params,
    ) -> Self {
        Self {
            engine,
            request,
            response,
            params,
            keys: None,
            errors: Vec::new(),
            chain,
            index: 0,
            aborted: false,
        }
    }

    pub(crate) fn into_response(self) -> Response {
        self.response
    }

    /// Runs the remaining handlers in the chain, in order.
    ///
    /// The engine calls this once to start the chain; a middleware calls it
    /// again to resume downstream handlers before finishing its own work.
    /// Calling `next` after the chain is exhausted or aborted is a no-op.
    pub fn next(&mut self) {
        while !self.aborted && self.index < self.chain.len() {
            let handler = self.chain[self.index].clone();
            self.index += 1;
            handler.handle(self);
        }
    }

    /// Stops the chain and writes the given status to the response.
    ///
    /// Handlers after the current one never run; the current handler finishes
    /// normally, as do the tail ends of any middleware already on the stack.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    pub fn abort<S>(&mut self, status: S)
    where
        S: TryInto<StatusCode>,
        S::Error: fmt::Debug,
    {
        self.response.set_status(status);
        self.aborted = true;
    }

    /// Records `err` and aborts with the given status.
    ///
    /// Equivalent to `ctx.error(err, "operation aborted")` followed by
    /// `ctx.abort(status)`.
    pub fn fail<S>(&mut self, status: S, err: impl fmt::Display)
    where
        S: TryInto<StatusCode>,
        S::Error: fmt::Debug,
    {
        self.error(err, "operation aborted");
        self.abort(status);
    }

    /// Appends an error to the context's error list.
    ///
    /// Recording an error never aborts the chain and never writes to the
    /// response; it is bookkeeping for later middleware to inspect. Attach
    /// whatever `meta` helps diagnosis - a string, or a
    /// [`serde_json::json!`] object.
    pub fn error(&mut self, err: impl fmt::Display, meta: impl Into<Value>) {
        self.errors.push(ErrorEntry {
            message: err.to_string(),
            meta: meta.into(),
        });
    }

    /// Returns the errors recorded so far, in recording order.
    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// Returns `true` once [`abort`](Self::abort) has been called.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Returns the inbound request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the inbound request mutably.
    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Returns the response under construction.
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Returns the response under construction, mutably.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Returns the matched path parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Returns the path parameter captured under `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Stores a value under `key` for the remainder of this request.
    ///
    /// The backing map is allocated on the first call; requests that never
    /// store anything pay nothing.
    pub fn set(&mut self, key: impl Into<String>, value: impl Any + Send + Sync) {
        self.keys
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), Box::new(value));
    }

    /// Returns the value stored under `key`, if present and of type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.keys.as_ref()?.get(key)?.downcast_ref()
    }

    /// Returns the value stored under `key`, panicking if absent.
    ///
    /// Only call this for keys an earlier handler is guaranteed to have
    /// [`set`](Self::set); a missing key is a programming error, not a
    /// request-time condition. Use [`get`](Self::get) when absence is
    /// possible.
    ///
    /// # Panics
    ///
    /// Panics if no value of type `T` is stored under `key`.
    pub fn must_get<T: Any>(&self, key: &str) -> &T {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key {key:?} is not set on this context"),
        }
    }

    /// Serializes `value` as the JSON response body.
    ///
    /// Writes the status, sets `Content-Type: application/json`, and encodes
    /// `value`. If encoding fails the error is recorded on the context and
    /// the response becomes a plain-text 500 carrying the error message; the
    /// handler should return promptly afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    pub fn json<S, T>(&mut self, status: S, value: &T)
    where
        S: TryInto<StatusCode>,
        S::Error: fmt::Debug,
        T: Serialize + ?Sized,
    {
        self.response.set_status(status);
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.response
                    .insert_header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
                self.response.set_body(body);
            }
            Err(err) => self.render_failed(
                RenderError::Json(err),
                json!({ "type": type_name::<T>() }),
            ),
        }
    }

    /// Serializes `value` as the XML response body.
    ///
    /// Same status/content-type convention and failure behavior as
    /// [`json`](Self::json), with `Content-Type: application/xml`.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    #[cfg(feature = "xml")]
    pub fn xml<S, T>(&mut self, status: S, value: &T)
    where
        S: TryInto<StatusCode>,
        S::Error: fmt::Debug,
        T: Serialize,
    {
        self.response.set_status(status);
        match quick_xml::se::to_string(value) {
            Ok(body) => {
                self.response
                    .insert_header(header::CONTENT_TYPE, "application/xml");
                self.response.set_body(body);
            }
            Err(err) => self.render_failed(
                RenderError::Xml(err),
                json!({ "type": type_name::<T>() }),
            ),
        }
    }

    /// Renders the named template as the HTML response body.
    ///
    /// `data` is serialized into the template context. Requires a template
    /// store loaded via [`Engine::load_templates`] or
    /// [`Engine::add_template`]; a missing store or a render failure is
    /// recorded and converted into a plain-text 500, like the other helpers.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    ///
    /// [`Engine::load_templates`]: crate::Engine::load_templates
    /// [`Engine::add_template`]: crate::Engine::add_template
    #[cfg(feature = "templates")]
    pub fn html<S, T>(&mut self, status: S, name: &str, data: &T)
    where
        S: TryInto<StatusCode>,
        S::Error: fmt::Debug,
        T: Serialize,
    {
        self.response.set_status(status);
        let rendered = self
            .engine
            .templates()
            .ok_or(RenderError::TemplatesNotLoaded)
            .and_then(|templates| {
                let data = tera::Context::from_serialize(data)?;
                Ok(templates.render(name, &data)?)
            });
        match rendered {
            Ok(body) => {
                self.response
                    .insert_header(header::CONTENT_TYPE, mime::TEXT_HTML_UTF_8.as_ref());
                self.response.set_body(body);
            }
            Err(err) => self.render_failed(err, json!({ "template": name })),
        }
    }

    /// Writes a plain-text response body.
    ///
    /// Sets `Content-Type: text/plain` and the given status. Infallible.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    pub fn string<S>(&mut self, status: S, text: impl Into<String>)
    where
        S: TryInto<StatusCode>,
        S::Error: fmt::Debug,
    {
        self.response.set_status(status);
        self.response
            .insert_header(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref());
        self.response.set_body(text.into());
    }

    /// Writes raw bytes as the response body.
    ///
    /// Sets the given status and leaves the content type untouched.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    pub fn data<S>(&mut self, status: S, body: impl Into<bytes::Bytes>)
    where
        S: TryInto<StatusCode>,
        S::Error: fmt::Debug,
    {
        self.response.set_status(status);
        self.response.set_body(body);
    }

    // Recover-locally path shared by the render helpers: record, then replace
    // the response with a plain-text 500. No cursor jump.
    fn render_failed(&mut self, err: RenderError, meta: Value) {
        let text = err.to_string();
        self.error(&err, meta);
        self.response.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        self.response
            .insert_header(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref());
        self.response.set_body(text);
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("method", self.request.method())
            .field("uri", self.request.uri())
            .field("status", &self.response.status())
            .field("index", &self.index)
            .field("aborted", &self.aborted)
            .field("errors", &self.errors)
            .finish_non_exhaustive()
    }
}
