#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]
//! A minimal middleware-oriented web framework for Rust.
//!
//! This crate routes incoming requests through ordered chains of handler
//! functions. Routes are registered on an [`Engine`] (directly, or through
//! nested [`RouterGroup`] scopes that share a path prefix and a middleware
//! chain), and every request gets a fresh [`Context`] that walks the matched
//! chain, carries per-request state, and serializes the response.
//!
//! # Features
//!
//! - **Grouped routing** - Path-prefix scopes with inherited middleware chains,
//!   matched by a radix-tree router with `:name` path parameters
//! - **Onion middleware** - A handler calls [`Context::next`] to run the rest
//!   of the chain, then resumes with the response in hand
//! - **Short-circuiting** - [`Context::abort`] stops the remaining chain and
//!   writes a status in one step
//! - **Error collection** - [`Context::error`] records errors for a logging
//!   middleware to inspect, without touching control flow
//! - **Response helpers** - JSON, XML, template, plain-text, and raw-byte
//!   serialization straight from the context
//!
//! # Optional Features
//!
//! - `xml` - XML response serialization via quick-xml (enabled by default)
//! - `templates` - Named HTML templates via tera (enabled by default)
//! - `server` - A tokio + hyper serve loop behind [`Engine::run`] (enabled by
//!   default); without it the engine is driven through
//!   [`Engine::handle_request`]
//!
//! # Examples
//!
//! ## Routing and handlers
//!
//! ```rust
//! use gantry::{Bytes, Context, Engine};
//!
//! let mut app = Engine::new();
//! app.get("/hello", |ctx: &mut Context| {
//!     ctx.string(200, "hello world");
//! });
//!
//! let request = http::Request::builder()
//!     .uri("/hello")
//!     .body(Bytes::new())
//!     .unwrap();
//! let response = app.handle_request(request);
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.body().as_ref(), b"hello world");
//! ```
//!
//! ## Middleware around a route
//!
//! ```rust
//! use gantry::{handlers, Context, Engine, Method};
//!
//! let mut app = Engine::new();
//! app.handle(Method::GET, "/time", handlers![
//!     |ctx: &mut Context| {
//!         let start = std::time::Instant::now();
//!         ctx.next();
//!         log::info!("handled in {:?}", start.elapsed());
//!     },
//!     |ctx: &mut Context| ctx.string(200, "tick"),
//! ]);
//! ```
//!
//! ## Groups and path parameters
//!
//! ```rust
//! use gantry::{Bytes, Context, Engine};
//!
//! let mut app = Engine::new();
//! let mut api = app.group("/api");
//! api.get("/users/:id", |ctx: &mut Context| {
//!     let id = ctx.param("id").unwrap_or("unknown").to_owned();
//!     ctx.json(200, &serde_json::json!({ "id": id }));
//! });
//!
//! let request = http::Request::builder()
//!     .uri("/api/users/42")
//!     .body(Bytes::new())
//!     .unwrap();
//! assert_eq!(app.handle_request(request).status(), 200);
//! ```

#[macro_use]
mod macros;

pub mod error;
pub use error::{ErrorEntry, RenderError};

mod handler;
pub use handler::{AnyHandler, Handler};

mod context;
pub use context::{Context, Params};

mod response;
pub use response::Response;

mod routing;
pub use routing::RouterGroup;

mod engine;
pub use engine::Engine;

pub mod middleware;

#[cfg(feature = "server")]
mod server;

/// A type alias for inbound HTTP requests with a fully buffered byte body.
pub type Request = http::Request<Bytes>;

pub use bytes::Bytes;
pub use http::{header, method, uri, version, Method, StatusCode, Uri, Version};
