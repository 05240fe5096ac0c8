//! Request-scoped context shared by every pipeline stage.
//!
//! # Design Decisions
//! - Fixed fields for what the dispatcher itself knows (request ID, route, start time)
//! - Everything else goes into a type-keyed extension map, so two callbacks
//!   can only share a value if they agree on its Rust type
//! - Owned by the dispatcher; stages borrow it mutably for one call

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::Extensions;

/// Per-request scratch space, created at `Received` and dropped at `Done`.
#[derive(Debug)]
pub struct Context {
    request_id: String,
    route: Arc<str>,
    received_at: Instant,
    extensions: Extensions,
}

impl Context {
    pub fn new(request_id: impl Into<String>, route: Arc<str>) -> Self {
        Self {
            request_id: request_id.into(),
            route,
            received_at: Instant::now(),
            extensions: Extensions::new(),
        }
    }

    /// Request ID assigned by the transport layer (`x-request-id`).
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Name of the message being dispatched.
    pub fn route(&self) -> &str {
        &self.route
    }

    /// Time elapsed since the request was received.
    pub fn elapsed(&self) -> Duration {
        self.received_at.elapsed()
    }

    /// Store a value, returning the previous value of the same type.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get::<T>()
    }

    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.extensions.get_mut::<T>()
    }

    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions.remove::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct UserId(u64);

    #[derive(Clone, Debug, PartialEq)]
    struct Tenant(u64);

    #[test]
    fn test_values_are_keyed_by_type() {
        let mut ctx = Context::new("req-1", Arc::from("echo"));
        ctx.insert(UserId(7));
        ctx.insert(Tenant(9));

        assert_eq!(ctx.get::<UserId>(), Some(&UserId(7)));
        assert_eq!(ctx.get::<Tenant>(), Some(&Tenant(9)));

        assert_eq!(ctx.insert(UserId(8)), Some(UserId(7)));
        if let Some(tenant) = ctx.get_mut::<Tenant>() {
            tenant.0 += 1;
        }
        assert_eq!(ctx.remove::<Tenant>(), Some(Tenant(10)));
        assert!(ctx.get::<Tenant>().is_none());
    }

    #[test]
    fn test_fixed_fields() {
        let ctx = Context::new("abc", Arc::from("login"));
        assert_eq!(ctx.request_id(), "abc");
        assert_eq!(ctx.route(), "login");
        assert!(ctx.elapsed() >= Duration::ZERO);
    }
}
