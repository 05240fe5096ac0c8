//! Compiled routes and the URL dispatch table.
//!
//! # Design Decisions
//! - Immutable after construction (shared across requests without locks)
//! - Exact URL lookup only; no patterns, no method matching
//! - Iteration in registration order for deterministic start-up logs

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::dispatch::callback::CallbackChain;
use crate::dispatch::reply::Procedure;

/// A route with its fully resolved pipeline.
pub struct CompiledRoute {
    name: Arc<str>,
    url: String,
    pre: CallbackChain,
    procedure: Arc<dyn Procedure>,
    post: CallbackChain,
}

impl CompiledRoute {
    pub(crate) fn new(
        name: Arc<str>,
        url: String,
        pre: CallbackChain,
        procedure: Arc<dyn Procedure>,
        post: CallbackChain,
    ) -> Self {
        Self {
            name,
            url,
            pre,
            procedure,
            post,
        }
    }

    /// Message name as registered.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        self.name.clone()
    }

    /// Full URL: prefix followed by name.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn pre_chain(&self) -> &CallbackChain {
        &self.pre
    }

    pub fn post_chain(&self) -> &CallbackChain {
        &self.post
    }

    pub fn procedure(&self) -> &dyn Procedure {
        self.procedure.as_ref()
    }
}

impl fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("url", &self.url)
            .field("pre", &self.pre.names())
            .field("post", &self.post.names())
            .finish_non_exhaustive()
    }
}

/// URL to compiled route mapping produced by a single compilation.
#[derive(Debug, Default)]
pub struct DispatchTable {
    routes: Vec<Arc<CompiledRoute>>,
    by_url: HashMap<String, usize>,
}

impl DispatchTable {
    /// Insert a route. Returns the route back if its URL is already taken.
    pub(crate) fn insert(&mut self, route: CompiledRoute) -> Result<(), CompiledRoute> {
        if self.by_url.contains_key(route.url()) {
            return Err(route);
        }
        self.by_url.insert(route.url().to_string(), self.routes.len());
        self.routes.push(Arc::new(route));
        Ok(())
    }

    pub fn get(&self, url: &str) -> Option<&Arc<CompiledRoute>> {
        self.by_url.get(url).map(|&index| &self.routes[index])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// URLs in registration order.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|route| route.url())
    }

    pub fn routes(&self) -> impl Iterator<Item = &Arc<CompiledRoute>> {
        self.routes.iter()
    }
}
