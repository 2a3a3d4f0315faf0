//! HTTP response sink.
//!
//! [`Response`] is the outbound side of a request's [`Context`]: status code,
//! headers, and a fully buffered byte body. Handlers normally go through the
//! context's serialization helpers ([`Context::json`], [`Context::string`],
//! ...) and only touch the response directly for raw header or body work.
//!
//! [`Context`]: crate::Context
//! [`Context::json`]: crate::Context::json
//! [`Context::string`]: crate::Context::string

use bytes::Bytes;
use core::fmt::Debug;
use http::{header::HeaderName, HeaderMap, HeaderValue, StatusCode};

/// An HTTP response with status, headers, and a buffered body.
///
/// A fresh response starts as `200 OK` with no headers and an empty body;
/// the handler chain mutates it in place and the engine hands the final
/// state to the host server once the chain completes or aborts.
///
/// # Examples
///
/// ```rust
/// use gantry::{Response, StatusCode};
///
/// let response = Response::new(201, "created");
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert_eq!(response.body().as_ref(), b"created");
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl Response {
    /// Creates a response with the given status code and body.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    pub fn new<S>(status: S, body: impl Into<Bytes>) -> Self
    where
        S: TryInto<StatusCode>,
        S::Error: Debug,
    {
        let mut response = Self::empty();
        response.set_status(status);
        response.body = body.into();
        response
    }

    /// Creates an empty `200 OK` response.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status code.
    ///
    /// # Panics
    ///
    /// Panics if `status` does not convert into a valid status code.
    pub fn set_status<S>(&mut self, status: S)
    where
        S: TryInto<StatusCode>,
        S::Error: Debug,
    {
        self.status = status.try_into().expect("invalid status code");
    }

    /// Returns a reference to the header map.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a mutable reference to the header map.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Inserts a header, replacing any previous value under the same name.
    ///
    /// # Panics
    ///
    /// Panics if `value` does not convert into a valid header value.
    pub fn insert_header<V>(&mut self, name: HeaderName, value: V)
    where
        V: TryInto<HeaderValue>,
        V::Error: Debug,
    {
        self.headers
            .insert(name, value.try_into().expect("invalid header value"));
    }

    /// Returns the response body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replaces the response body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Consumes the response, returning status, headers, and body.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Bytes) {
        (self.status, self.headers, self.body)
    }
}

impl From<Response> for http::Response<Bytes> {
    fn from(response: Response) -> Self {
        let (status, headers, body) = response.into_parts();
        let mut out = http::Response::new(body);
        *out.status_mut() = status;
        *out.headers_mut() = headers;
        out
    }
}
