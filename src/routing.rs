//! Route groups and chain composition.
//!
//! A [`RouterGroup`] scopes a path prefix and a middleware chain over the
//! routes registered through it. Groups nest: a child joins its prefix onto
//! the parent's and snapshots the parent's combined chain at creation time,
//! so middleware added to the parent *afterwards* does not retroactively
//! apply. Registration is a setup-phase activity - groups borrow the engine
//! mutably, which keeps registration and serving from overlapping.
//!
//! ```rust
//! use gantry::{Context, Engine};
//!
//! fn require_token(ctx: &mut Context) {
//!     if ctx.request().headers().get("authorization").is_none() {
//!         ctx.abort(401);
//!     }
//! }
//!
//! let mut app = Engine::new();
//! let mut api = app.group("/api");
//! api.use_middleware(require_token);
//!
//! let mut v1 = api.group("/v1");
//! v1.get("/ping", |ctx: &mut Context| ctx.string(200, "pong"));
//! // registered as GET /api/v1/ping with chain [require_token, handler]
//! ```

use crate::{handler::AnyHandler, Engine, Handler, Method};
use core::fmt;
use std::sync::Arc;

/// A registration scope with a path prefix and an inherited middleware chain.
///
/// Created by [`Engine::group`] or [`RouterGroup::group`]. All registration
/// methods mirror the engine's; routes registered here get the group's prefix
/// prepended and the group's chain run ahead of their own handlers.
pub struct RouterGroup<'e> {
    pub(crate) engine: &'e mut Engine,
    pub(crate) prefix: String,
    pub(crate) chain: Vec<AnyHandler>,
}

impl RouterGroup<'_> {
    /// Returns the group's full path prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Appends a middleware to this group's chain.
    ///
    /// Only routes registered on this group (or on groups created from it)
    /// *after* this call run the middleware; chains of already-registered
    /// routes are frozen.
    pub fn use_middleware(&mut self, handler: impl Handler) -> &mut Self {
        self.chain.push(AnyHandler::new(handler));
        self
    }

    /// Creates a child group under `prefix`.
    ///
    /// The child starts with this group's current combined chain; extend it
    /// with [`use_middleware`](Self::use_middleware) before registering
    /// routes.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        RouterGroup {
            prefix: join_paths(&self.prefix, prefix),
            chain: self.chain.clone(),
            engine: &mut *self.engine,
        }
    }

    /// Registers a route for `method` under the group's prefix.
    ///
    /// The final chain is the group's chain followed by `handlers`, in that
    /// order; build `handlers` with the [`handlers!`](crate::handlers) macro.
    /// The last entry is conventionally the route handler.
    ///
    /// # Panics
    ///
    /// Panics if the route conflicts with one already registered.
    pub fn handle(&mut self, method: Method, path: &str, handlers: Vec<AnyHandler>) -> &mut Self {
        let path = join_paths(&self.prefix, path);
        let chain: Arc<[AnyHandler]> = combine(&self.chain, handlers).into();
        self.engine.register_route(method, path, chain);
        self
    }

    impl_verbs!(GET => get, POST => post, PUT => put, PATCH => patch, DELETE => delete);
}

impl fmt::Debug for RouterGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterGroup")
            .field("prefix", &self.prefix)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

/// Concatenates a group chain with route handlers, group entries first.
pub(crate) fn combine(chain: &[AnyHandler], extra: Vec<AnyHandler>) -> Vec<AnyHandler> {
    let mut combined = Vec::with_capacity(chain.len() + extra.len());
    combined.extend_from_slice(chain);
    combined.extend(extra);
    combined
}

/// Joins two path fragments into a normalized absolute path.
///
/// Empty segments collapse, so `join_paths("/api/", "/users")` and
/// `join_paths("/api", "users")` both yield `/api/users`. The empty join
/// yields `/`.
pub(crate) fn join_paths(prefix: &str, path: &str) -> String {
    let mut joined = String::with_capacity(prefix.len() + path.len() + 1);
    for segment in prefix.split('/').chain(path.split('/')) {
        if !segment.is_empty() {
            joined.push('/');
            joined.push_str(segment);
        }
    }
    if joined.is_empty() {
        joined.push('/');
    }
    joined
}
