//! Procedure trait and reply values.

use std::fmt;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde::Serialize;

use crate::dispatch::context::Context;

/// Business logic bound to one route.
///
/// Implemented for any `Fn(&mut Context, Bytes) -> Reply`, so plain functions
/// and closures can be registered directly.
pub trait Procedure: Send + Sync + 'static {
    fn call(&self, ctx: &mut Context, payload: Bytes) -> Reply;
}

impl<F> Procedure for F
where
    F: Fn(&mut Context, Bytes) -> Reply + Send + Sync + 'static,
{
    fn call(&self, ctx: &mut Context, payload: Bytes) -> Reply {
        self(ctx, payload)
    }
}

/// Type-erased serializable reply body.
pub trait ReplyBody: Send {
    fn encode(&self) -> serde_json::Result<Vec<u8>>;
}

impl<T: Serialize + Send> ReplyBody for T {
    fn encode(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }
}

/// What a procedure hands back to the dispatcher.
pub enum Reply {
    /// Write only this status; no body, post-chain skipped.
    Status(StatusCode),
    /// Encode as JSON and write it as the response body.
    Body(Box<dyn ReplyBody>),
}

impl Reply {
    pub fn status(status: StatusCode) -> Self {
        Reply::Status(status)
    }

    pub fn json<T: Serialize + Send + 'static>(value: T) -> Self {
        Reply::Body(Box::new(value))
    }
}

impl From<StatusCode> for Reply {
    fn from(status: StatusCode) -> Self {
        Reply::Status(status)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Status(status) => f.debug_tuple("Status").field(status).finish(),
            Reply::Body(_) => f.write_str("Body(..)"),
        }
    }
}
