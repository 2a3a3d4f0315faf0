//! Serve-loop glue binding an [`Engine`] to a listening address.
//!
//! The dispatch core is synchronous; this module supplies the host side:
//! a tokio accept loop, hyper HTTP/1 connection handling, and the
//! buffered-body conversion between hyper's streaming types and the engine's
//! [`Request`]/[`Response`]. Handlers run synchronously inside the connection
//! task, one logical execution per request.

use crate::{Engine, Request};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{body::Incoming, server::conn::http1, service::service_fn};
use hyper_util::rt::TokioIo;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;
use tokio::net::TcpListener;

impl Engine {
    /// Binds the engine to `addr` and serves requests until the process
    /// exits, blocking the calling thread.
    ///
    /// Builds a private tokio runtime and drives [`serve`](Self::serve) on
    /// it. Call from a plain `main`; applications that already run a tokio
    /// runtime should use `serve` instead.
    ///
    /// Registration must be complete before this call - the engine is
    /// consumed, and no further routes can be added.
    pub fn run(self, addr: impl ToSocketAddrs) -> io::Result<()> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no address to bind"))?;
        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(self.serve(addr))
    }

    /// Serves requests on `addr`, spawning one task per connection.
    pub async fn serve(self, addr: SocketAddr) -> io::Result<()> {
        let engine = Arc::new(self);
        let listener = TcpListener::bind(addr).await?;
        log::info!("listening on {addr}");

        loop {
            let (stream, peer) = listener.accept().await?;
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |request: hyper::Request<Incoming>| {
                    let engine = Arc::clone(&engine);
                    async move { dispatch(&engine, request).await }
                });
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    log::error!("connection error from {peer}: {err}");
                }
            });
        }
    }
}

async fn dispatch(
    engine: &Engine,
    request: hyper::Request<Incoming>,
) -> Result<hyper::Response<Full<Bytes>>, hyper::Error> {
    let (parts, body) = request.into_parts();
    let body = body.collect().await?.to_bytes();
    let request = Request::from_parts(parts, body);

    let response = engine.handle_request(request);
    let (status, headers, body) = response.into_parts();

    let mut out = hyper::Response::new(Full::new(body));
    *out.status_mut() = status;
    *out.headers_mut() = headers;
    Ok(out)
}
