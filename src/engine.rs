//! The engine: root routing scope and request entry point.
//!
//! An [`Engine`] owns everything shared across requests: the per-method
//! routing tables, the global middleware chain, the not-found chain, and the
//! template store. Configuration happens through `&mut self` during setup;
//! serving only ever takes `&self`, so the two phases cannot overlap.

use crate::{
    context::{Context, Params},
    handler::AnyHandler,
    routing::{combine, join_paths, RouterGroup},
    Handler, Method, Request, Response, StatusCode,
};
use core::fmt;
use http::header;
use std::{collections::HashMap, sync::Arc};

/// The request entry point and root [`RouterGroup`].
///
/// Routes registered directly on the engine live at the root prefix and
/// inherit only the global middleware installed with
/// [`use_middleware`](Self::use_middleware). [`group`](Self::group) opens
/// nested scopes; [`handle_request`](Self::handle_request) dispatches one
/// request; [`run`](Self::run) binds the engine to a listening address.
///
/// # Examples
///
/// ```rust
/// use gantry::{middleware, Context, Engine};
///
/// let mut app = Engine::new();
/// app.use_middleware(middleware::logger());
/// app.get("/health", |ctx: &mut Context| ctx.string(200, "ok"));
/// ```
pub struct Engine {
    routes: HashMap<Method, matchit::Router<Arc<[AnyHandler]>>>,
    root_handlers: Vec<AnyHandler>,
    not_found: Option<Vec<AnyHandler>>,
    #[cfg(feature = "templates")]
    templates: Option<tera::Tera>,
}

impl Engine {
    /// Creates a blank engine with no middleware attached.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            root_handlers: Vec::new(),
            not_found: None,
            #[cfg(feature = "templates")]
            templates: None,
        }
    }

    /// Creates an engine with the bundled [`recovery`] and [`logger`]
    /// middleware already attached, in that order.
    ///
    /// [`recovery`]: crate::middleware::recovery
    /// [`logger`]: crate::middleware::logger
    pub fn with_default_stack() -> Self {
        let mut engine = Self::new();
        engine.use_middleware(crate::middleware::recovery());
        engine.use_middleware(crate::middleware::logger());
        engine
    }

    /// Appends a global middleware, run ahead of every route registered
    /// afterwards (including the not-found chain).
    pub fn use_middleware(&mut self, handler: impl Handler) -> &mut Self {
        self.root_handlers.push(AnyHandler::new(handler));
        self
    }

    /// Opens a registration scope under `prefix`.
    ///
    /// The group starts with the engine's current global chain; see
    /// [`RouterGroup`] for how scopes nest and compose.
    pub fn group(&mut self, prefix: &str) -> RouterGroup<'_> {
        let chain = self.root_handlers.clone();
        RouterGroup {
            prefix: join_paths("", prefix),
            chain,
            engine: self,
        }
    }

    /// Registers a route at the root prefix.
    ///
    /// The final chain is the global middleware followed by `handlers`;
    /// build `handlers` with the [`handlers!`](crate::handlers) macro.
    ///
    /// # Panics
    ///
    /// Panics if the route conflicts with one already registered.
    pub fn handle(&mut self, method: Method, path: &str, handlers: Vec<AnyHandler>) -> &mut Self {
        let path = join_paths("", path);
        let chain: Arc<[AnyHandler]> = combine(&self.root_handlers, handlers).into();
        self.register_route(method, path, chain);
        self
    }

    impl_verbs!(GET => get, POST => post, PUT => put, PATCH => patch, DELETE => delete);

    /// Replaces the chain run when no route matches.
    ///
    /// The handlers run after the global middleware, with the response status
    /// pre-set to 404. Without a custom chain, unmatched requests get a
    /// plain-text `404 page not found` body.
    pub fn set_not_found(&mut self, handlers: Vec<AnyHandler>) -> &mut Self {
        self.not_found = Some(handlers);
        self
    }

    /// Loads every template matching the glob `pattern` into the engine's
    /// template store, keyed by file name.
    ///
    /// # Panics
    ///
    /// Panics if any template fails to parse. Template configuration errors
    /// are unrecoverable setup errors, not per-request conditions.
    #[cfg(feature = "templates")]
    pub fn load_templates(&mut self, pattern: &str) -> &mut Self {
        match tera::Tera::new(pattern) {
            Ok(templates) => {
                log::debug!("loaded templates matching {pattern:?}");
                self.templates = Some(templates);
            }
            Err(err) => panic!("failed to load templates from {pattern:?}: {err}"),
        }
        self
    }

    /// Adds a single template from an in-memory source string.
    ///
    /// Useful for tests and small applications without a template directory.
    ///
    /// # Panics
    ///
    /// Panics if the template source fails to parse, like
    /// [`load_templates`](Self::load_templates).
    #[cfg(feature = "templates")]
    pub fn add_template(&mut self, name: &str, source: &str) -> &mut Self {
        let templates = self.templates.get_or_insert_with(tera::Tera::default);
        if let Err(err) = templates.add_raw_template(name, source) {
            panic!("failed to parse template {name:?}: {err}");
        }
        self
    }

    #[cfg(feature = "templates")]
    pub(crate) fn templates(&self) -> Option<&tera::Tera> {
        self.templates.as_ref()
    }

    /// Dispatches one request through the matching handler chain and returns
    /// the finished response.
    ///
    /// This is the synchronous core the server glue drives; tests can call it
    /// directly without any runtime. Anything that does not match a
    /// registered `(method, path)` pair - unknown paths and method mismatches
    /// alike - takes the not-found path.
    pub fn handle_request(&self, request: Request) -> Response {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let matched = self.routes.get(&method).and_then(|router| {
            let matched = router.at(&path).ok()?;
            let params = matched
                .params
                .iter()
                .map(|(name, value)| (name.to_owned(), value.to_owned()))
                .collect();
            Some((Arc::clone(matched.value), Params::new(params)))
        });

        match matched {
            Some((chain, params)) => {
                let mut ctx = Context::new(self, request, Response::default(), chain, params);
                ctx.next();
                ctx.into_response()
            }
            None => self.handle_not_found(request),
        }
    }

    fn handle_not_found(&self, request: Request) -> Response {
        let mut response = Response::default();
        response.set_status(StatusCode::NOT_FOUND);

        let chain: Arc<[AnyHandler]> = match &self.not_found {
            Some(custom) => combine(&self.root_handlers, custom.clone()).into(),
            None => {
                response.insert_header(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.as_ref());
                response.set_body("404 page not found");
                self.root_handlers.clone().into()
            }
        };

        let mut ctx = Context::new(self, request, response, chain, Params::default());
        ctx.next();
        ctx.into_response()
    }

    pub(crate) fn register_route(&mut self, method: Method, path: String, chain: Arc<[AnyHandler]>) {
        log::debug!("route {method} {path} ({} handlers)", chain.len());
        let router = self
            .routes
            .entry(method.clone())
            .or_insert_with(matchit::Router::new);
        if let Err(err) = router.insert(path.as_str(), chain) {
            panic!("invalid route {method} {path}: {err}");
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("methods", &self.routes.len())
            .field("root_handlers", &self.root_handlers)
            .field("custom_not_found", &self.not_found.is_some())
            .finish_non_exhaustive()
    }
}
