//! Request handler abstraction.
//!
//! A handler is a unary function over a request's [`Context`]: it reads the
//! request, mutates the response, records errors, or calls
//! [`Context::next`] to drive the rest of the chain before resuming. Handlers
//! communicate their outcome solely through the context - they return
//! nothing.
//!
//! Middleware and route handlers share this one trait; the only difference is
//! position in the chain. Any `Fn(&mut Context) + Send + Sync + 'static`
//! closure or function is a handler:
//!
//! ```rust
//! use gantry::{Context, Engine};
//!
//! fn hello(ctx: &mut Context) {
//!     ctx.string(200, "hello");
//! }
//!
//! let mut app = Engine::new();
//! app.get("/fn", hello);
//! app.get("/closure", |ctx: &mut Context| ctx.string(200, "hi"));
//! ```

use crate::Context;
use core::{any::type_name, fmt::Debug};
use std::sync::Arc;

/// Trait for functions that process one position of a request's handler chain.
///
/// Implementations must be shareable across threads: a registered chain is
/// stored once and executed by whichever connection task picks up the
/// request. A handler that wants downstream handlers to run before its own
/// tail logic calls [`Context::next`]; one that wants to stop the chain calls
/// [`Context::abort`].
///
/// Most code never implements this trait by hand - the blanket impl covers
/// plain functions and closures.
pub trait Handler: Send + Sync + 'static {
    /// Processes the request at this chain position.
    fn handle(&self, ctx: &mut Context);

    /// Returns the type name of the handler, for debugging and logging.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// Type-erased, cheaply cloneable handler.
///
/// Chains store handlers of heterogeneous concrete types, so registration
/// erases them behind an `Arc<dyn Handler>`. Cloning an `AnyHandler` only
/// bumps a reference count; the same erased handler is shared by every chain
/// that includes it.
///
/// # Example
///
/// ```rust
/// use gantry::{AnyHandler, Context};
///
/// let handler = AnyHandler::new(|ctx: &mut Context| ctx.string(200, "ok"));
/// let chain: Vec<AnyHandler> = vec![handler.clone(), handler];
/// assert_eq!(chain.len(), 2);
/// ```
#[derive(Clone)]
pub struct AnyHandler(Arc<dyn Handler>);

impl AnyHandler {
    /// Wraps any handler implementation behind a shared trait object.
    pub fn new(handler: impl Handler) -> Self {
        Self(Arc::new(handler))
    }
}

impl Handler for AnyHandler {
    fn handle(&self, ctx: &mut Context) {
        self.0.handle(ctx)
    }

    fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Debug for AnyHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("AnyHandler[{}]", self.name()))
    }
}
