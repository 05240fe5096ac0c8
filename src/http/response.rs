//! Response handling for the dispatch pipeline.
//!
//! # Responsibilities
//! - Give callbacks a writable view of the outgoing response (status, headers)
//! - Hold the encoded reply body until the dispatcher commits it
//! - Turn the sink into an axum `Response` exactly once
//!
//! # Design Decisions
//! - Status defaults to 200, matching an untouched response writer
//! - After commit the sink is read-only: writes are dropped and logged, so
//!   the post-chain can observe but never alter what the client receives

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;

/// Writable response handed to callbacks alongside the request head.
#[derive(Debug)]
pub struct ResponseSink {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    committed: bool,
}

impl ResponseSink {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            committed: false,
        }
    }

    /// Current response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers written so far.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Body bytes of the committed reply (empty before commit or for status-only replies).
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether the response has already been handed to the transport.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// Set the response status. Ignored once committed.
    pub fn set_status(&mut self, status: StatusCode) {
        if self.reject_write("status") {
            return;
        }
        self.status = status;
    }

    /// Insert (or replace) a response header. Ignored once committed.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        if self.reject_write("header") {
            return;
        }
        self.headers.insert(name, value);
    }

    /// Set the response body. Ignored once committed.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        if self.reject_write("body") {
            return;
        }
        self.body = body.into();
    }

    /// True if some callback already chose a content type.
    pub fn has_content_type(&self) -> bool {
        self.headers.contains_key(header::CONTENT_TYPE)
    }

    /// Freeze the sink and build the response the client will receive.
    ///
    /// The sink keeps a copy of status, headers and body so post-chain
    /// callbacks can still inspect them.
    pub fn commit(&mut self) -> Response {
        self.committed = true;

        let mut response = Response::new(Body::from(self.body.clone()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }

    fn reject_write(&self, what: &'static str) -> bool {
        if self.committed {
            tracing::debug!(write = what, "Response already committed, write ignored");
        }
        self.committed
    }
}

impl Default for ResponseSink {
    fn default() -> Self {
        Self::new()
    }
}
