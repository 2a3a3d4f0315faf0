//! Bundled middleware.
//!
//! Two handlers most applications want at the front of every chain:
//! [`logger`] and [`recovery`]. [`Engine::with_default_stack`] attaches both.
//!
//! Middleware here is nothing special - any [`Handler`](crate::Handler) that
//! calls [`Context::next`](crate::Context::next) and then does tail work is a
//! middleware. These are ordinary closures.
//!
//! [`Engine::with_default_stack`]: crate::Engine::with_default_stack

use crate::{Context, Handler, StatusCode};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Request logging middleware.
///
/// Logs the request line, final status, and latency at `info` level after the
/// downstream chain completes, and every error recorded on the context at
/// `error` level. Install it early so its nested `next()` wraps the whole
/// chain:
///
/// ```rust
/// use gantry::{middleware, Engine};
///
/// let mut app = Engine::new();
/// app.use_middleware(middleware::logger());
/// ```
pub fn logger() -> impl Handler {
    |ctx: &mut Context| {
        let method = ctx.request().method().clone();
        let path = ctx.request().uri().path().to_owned();
        let start = Instant::now();

        ctx.next();

        let status = ctx.response().status();
        log::info!("{method} {path} -> {status} in {:?}", start.elapsed());
        for entry in ctx.errors() {
            log::error!("{method} {path}: {} (meta: {})", entry.message, entry.meta);
        }
    }
}

/// Panic recovery middleware.
///
/// Catches a panic anywhere downstream, records it on the context, and aborts
/// with a 500 instead of letting the panic unwind out of the dispatch. The
/// connection stays usable and the client gets a response.
pub fn recovery() -> impl Handler {
    |ctx: &mut Context| {
        let result = panic::catch_unwind(AssertUnwindSafe(|| ctx.next()));
        if let Err(payload) = result {
            let message = payload
                .downcast_ref::<&str>()
                .map(|msg| (*msg).to_owned())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "handler panicked".to_owned());
            log::error!("recovered from panic: {message}");
            ctx.error(&message, "panic recovered");
            ctx.abort(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}
