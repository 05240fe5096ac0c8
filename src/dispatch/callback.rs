//! Callback chains run before and after a procedure.
//!
//! # Responsibilities
//! - Wrap boolean-returning pipeline stages behind a cheap, cloneable handle
//! - Run a chain in order, stopping at the first `false`
//!
//! # Design Decisions
//! - No rollback: effects of callbacks before the stop point are kept
//! - Cloning a chain copies the list; callbacks themselves are shared (`Arc`)

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use axum::http::request::Parts;

use crate::dispatch::context::Context;
use crate::http::ResponseSink;

type CallbackFn = dyn Fn(&mut Context, &Parts, &mut ResponseSink) -> bool + Send + Sync;

/// A single pipeline stage. Returning `false` stops the chain it belongs to.
#[derive(Clone)]
pub struct Callback {
    name: Cow<'static, str>,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Create an anonymous callback.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&mut Context, &Parts, &mut ResponseSink) -> bool + Send + Sync + 'static,
    {
        Self::named("anonymous", func)
    }

    /// Create a callback with a name used in logs and chain introspection.
    pub fn named<F>(name: impl Into<Cow<'static, str>>, func: F) -> Self
    where
        F: Fn(&mut Context, &Parts, &mut ResponseSink) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, ctx: &mut Context, parts: &Parts, sink: &mut ResponseSink) -> bool {
        (self.func)(ctx, parts, sink)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("name", &self.name).finish()
    }
}

/// Ordered list of callbacks.
#[derive(Clone, Debug, Default)]
pub struct CallbackChain {
    callbacks: Vec<Callback>,
}

impl CallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, callback: Callback) {
        self.callbacks.push(callback);
    }

    /// Append every callback of `other`, preserving order.
    pub fn extend(&mut self, other: &CallbackChain) {
        self.callbacks.extend(other.callbacks.iter().cloned());
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Callback names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.callbacks.iter().map(Callback::name).collect()
    }

    /// Run callbacks in order. Returns `false` as soon as one does, without
    /// running the rest; `true` only if all of them returned `true`.
    pub fn run(&self, ctx: &mut Context, parts: &Parts, sink: &mut ResponseSink) -> bool {
        for (index, callback) in self.callbacks.iter().enumerate() {
            if !callback.call(ctx, parts, sink) {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    callback = %callback.name(),
                    index,
                    "Callback chain stopped"
                );
                return false;
            }
        }
        true
    }
}

impl FromIterator<Callback> for CallbackChain {
    fn from_iter<I: IntoIterator<Item = Callback>>(iter: I) -> Self {
        Self {
            callbacks: iter.into_iter().collect(),
        }
    }
}
