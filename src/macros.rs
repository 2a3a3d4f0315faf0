/// Builds a `Vec<AnyHandler>` from a list of handlers.
///
/// Route registration through [`handle`](crate::Engine::handle) takes an
/// explicit handler chain; this macro wraps each expression in
/// [`AnyHandler::new`](crate::AnyHandler::new) so closures, functions, and
/// already-erased handlers can be mixed freely. The last handler is
/// conventionally the route handler, the ones before it are middleware.
///
/// # Example
///
/// ```rust
/// use gantry::{handlers, Context, Engine, Method};
///
/// let mut app = Engine::new();
/// app.handle(Method::GET, "/guarded", handlers![
///     |ctx: &mut Context| {
///         if ctx.request().headers().get("authorization").is_none() {
///             ctx.abort(401);
///         }
///     },
///     |ctx: &mut Context| ctx.string(200, "secret"),
/// ]);
/// ```
#[macro_export]
macro_rules! handlers {
    ($($handler:expr),* $(,)?) => {
        ::std::vec![$($crate::AnyHandler::new($handler)),*]
    };
}

macro_rules! impl_verbs {
    ($($method:ident => $fn_name:ident),* $(,)?) => {
        $(
            #[doc = concat!(
                "Registers a `", stringify!($method), "` route with a single handler.\n\n",
                "Shorthand for [`handle`](Self::handle) with [`Method::",
                stringify!($method), "`](crate::Method::", stringify!($method),
                "); use `handle` with the [`handlers!`](crate::handlers) macro to attach ",
                "per-route middleware in front of the handler.\n\n",
                "# Panics\n\nPanics if the route conflicts with one already registered.",
            )]
            pub fn $fn_name(&mut self, path: &str, handler: impl crate::Handler) -> &mut Self {
                self.handle(
                    crate::Method::$method,
                    path,
                    ::std::vec![crate::AnyHandler::new(handler)],
                )
            }
        )*
    };
}
