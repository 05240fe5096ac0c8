//! Per-route handler options.

use crate::dispatch::callback::{Callback, CallbackChain};

/// Per-route overrides of the global callback chains.
///
/// With the defaults a route inherits both global chains unchanged. Setting
/// `clear_pre_callbacks` / `clear_post_callbacks` drops the matching global
/// chain for this route; the route-local callbacks always run after whatever
/// global callbacks remain.
#[derive(Clone, Debug, Default)]
pub struct HandlerOptions {
    pub clear_pre_callbacks: bool,
    pub clear_post_callbacks: bool,
    pre: CallbackChain,
    post: CallbackChain,
}

impl HandlerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route-local pre-procedure callback.
    pub fn add_pre_callback(&mut self, callback: Callback) -> &mut Self {
        self.pre.push(callback);
        self
    }

    /// Append a route-local post-procedure callback.
    pub fn add_post_callback(&mut self, callback: Callback) -> &mut Self {
        self.post.push(callback);
        self
    }

    pub fn clear_pre(mut self) -> Self {
        self.clear_pre_callbacks = true;
        self
    }

    pub fn clear_post(mut self) -> Self {
        self.clear_post_callbacks = true;
        self
    }

    pub fn with_pre(mut self, callback: Callback) -> Self {
        self.pre.push(callback);
        self
    }

    pub fn with_post(mut self, callback: Callback) -> Self {
        self.post.push(callback);
        self
    }

    pub fn pre_callbacks(&self) -> &CallbackChain {
        &self.pre
    }

    pub fn post_callbacks(&self) -> &CallbackChain {
        &self.post
    }

    /// Effective pre-chain for a route: the global chain (unless cleared)
    /// followed by the route-local callbacks.
    pub(crate) fn resolve_pre(&self, global: &CallbackChain) -> CallbackChain {
        resolve(global, self.clear_pre_callbacks, &self.pre)
    }

    pub(crate) fn resolve_post(&self, global: &CallbackChain) -> CallbackChain {
        resolve(global, self.clear_post_callbacks, &self.post)
    }
}

fn resolve(global: &CallbackChain, clear: bool, local: &CallbackChain) -> CallbackChain {
    let mut chain = if clear {
        CallbackChain::new()
    } else {
        global.clone()
    };
    chain.extend(local);
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &'static str) -> Callback {
        Callback::named(name, |_, _, _| true)
    }

    fn global() -> CallbackChain {
        [noop("g1"), noop("g2")].into_iter().collect()
    }

    #[test]
    fn test_default_inherits_global() {
        let options = HandlerOptions::default();
        assert!(!options.clear_pre_callbacks);
        assert!(!options.clear_post_callbacks);
        assert_eq!(options.resolve_pre(&global()).names(), vec!["g1", "g2"]);
        assert_eq!(options.resolve_post(&global()).names(), vec!["g1", "g2"]);
    }

    #[test]
    fn test_local_appended_after_global() {
        let mut options = HandlerOptions::new();
        options.add_pre_callback(noop("x"));
        assert_eq!(options.resolve_pre(&global()).names(), vec!["g1", "g2", "x"]);
        assert_eq!(options.resolve_post(&global()).names(), vec!["g1", "g2"]);
    }

    #[test]
    fn test_clear_replaces_global() {
        let options = HandlerOptions::new().clear_pre().with_pre(noop("x"));
        assert_eq!(options.resolve_pre(&global()).names(), vec!["x"]);

        let options = HandlerOptions::new().clear_post();
        assert!(options.resolve_post(&global()).is_empty());
    }
}
