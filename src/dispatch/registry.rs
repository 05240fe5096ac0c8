//! Message registration and pipeline compilation.
//!
//! # Lifecycle
//! ```text
//! Open ──compile()──▶ Frozen
//!   │                   │
//!   ├ set_path_prefix   └ every mutation (and a second compile) is a fault
//!   ├ add_global_*_callback
//!   └ register / register_with_options
//! ```
//!
//! # Design Decisions
//! - One owned builder threaded through set-up; no process-wide globals
//! - Registration is sequential by contract (`&mut self`)
//! - Global chains are copied into each route at compile time, never referenced
//! - Duplicate names are detected at compile time as URL collisions

use std::sync::Arc;

use crate::dispatch::callback::{Callback, CallbackChain};
use crate::dispatch::error::{fault, RegistryError};
use crate::dispatch::options::HandlerOptions;
use crate::dispatch::reply::Procedure;
use crate::dispatch::table::{CompiledRoute, DispatchTable};

const SEPARATOR: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Frozen,
}

struct Registration {
    name: Arc<str>,
    procedure: Arc<dyn Procedure>,
    options: HandlerOptions,
}

/// Collects messages and global callbacks, then compiles them once.
pub struct RegistryBuilder {
    phase: Phase,
    prefix: String,
    global_pre: CallbackChain,
    global_post: CallbackChain,
    pending: Vec<Registration>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self {
            phase: Phase::Open,
            prefix: SEPARATOR.to_string(),
            global_pre: CallbackChain::new(),
            global_post: CallbackChain::new(),
            pending: Vec::new(),
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.phase == Phase::Frozen
    }

    /// Current URL prefix, always ending with exactly one `/`.
    pub fn path_prefix(&self) -> &str {
        &self.prefix
    }

    /// Number of registered, not yet compiled messages.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Set the URL prefix prepended to every message name.
    ///
    /// # Panics
    /// If the prefix is empty, does not start with `/`, or the registry is frozen.
    pub fn set_path_prefix(&mut self, prefix: &str) -> &mut Self {
        self.ensure_open("set_path_prefix");

        if prefix.is_empty() {
            fault(RegistryError::EmptyPrefix);
        }
        if !prefix.starts_with(SEPARATOR) {
            fault(RegistryError::RelativePrefix(prefix.to_string()));
        }

        let trimmed = prefix.trim_end_matches(SEPARATOR);
        self.prefix = format!("{trimmed}{SEPARATOR}");
        self
    }

    /// Append a callback to the global pre-procedure chain.
    ///
    /// # Panics
    /// If the registry is frozen.
    pub fn add_global_pre_callback(&mut self, callback: Callback) -> &mut Self {
        self.ensure_open("add_global_pre_callback");
        self.global_pre.push(callback);
        self
    }

    /// Append a callback to the global post-procedure chain.
    ///
    /// # Panics
    /// If the registry is frozen.
    pub fn add_global_post_callback(&mut self, callback: Callback) -> &mut Self {
        self.ensure_open("add_global_post_callback");
        self.global_post.push(callback);
        self
    }

    /// Register a message with default options.
    pub fn register<P: Procedure>(&mut self, name: &str, procedure: P) -> &mut Self {
        self.register_with_options(name, procedure, HandlerOptions::default())
    }

    /// Register a message reachable at `<prefix><name>`.
    ///
    /// # Panics
    /// If the name is empty or starts with `/`, or the registry is frozen.
    pub fn register_with_options<P: Procedure>(
        &mut self,
        name: &str,
        procedure: P,
        options: HandlerOptions,
    ) -> &mut Self {
        self.ensure_open("register");

        if name.is_empty() {
            fault(RegistryError::EmptyName);
        }
        if name.starts_with(SEPARATOR) {
            fault(RegistryError::SlashedName(name.to_string()));
        }

        self.pending.push(Registration {
            name: Arc::from(name),
            procedure: Arc::new(procedure),
            options,
        });
        self
    }

    /// Freeze the registry and build one compiled route per registration.
    ///
    /// # Panics
    /// If called twice, or if two messages resolve to the same URL.
    pub fn compile(&mut self) -> DispatchTable {
        self.ensure_open("compile");
        self.phase = Phase::Frozen;

        let mut table = DispatchTable::default();
        for registration in self.pending.drain(..) {
            let pre = registration.options.resolve_pre(&self.global_pre);
            let post = registration.options.resolve_post(&self.global_post);
            let url = format!("{}{}", self.prefix, registration.name);

            tracing::info!(
                url = %url,
                pre_callbacks = pre.len(),
                post_callbacks = post.len(),
                "Route compiled"
            );

            let route = CompiledRoute::new(registration.name, url, pre, registration.procedure, post);
            if let Err(route) = table.insert(route) {
                fault(RegistryError::DuplicateUrl {
                    url: route.url().to_string(),
                    name: route.name().to_string(),
                });
            }
        }

        table
    }

    #[track_caller]
    fn ensure_open(&self, operation: &'static str) {
        if self.phase == Phase::Frozen {
            fault(RegistryError::Frozen { operation });
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
