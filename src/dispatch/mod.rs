//! Message dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Set-up (single-threaded):
//!     set_path_prefix / add_global_*_callback / register
//!     → registry.rs (pending registrations + global chains)
//!
//! Start-up:
//!     registry.compile()
//!     → options.rs resolves each route's pre/post chains
//!     → table.rs (url → CompiledRoute, immutable)
//!     → registry frozen for the rest of the process
//!
//! Per request:
//!     DispatchTable lookup
//!     → dispatcher.rs (pre-chain → body → procedure → reply → post-chain)
//!     → context.rs lives for exactly one dispatch
//! ```
//!
//! # Design Decisions
//! - Misuse of the registry is a programming fault (panic), never a `Result`
//! - Per-request failures become status codes and stay within the request
//! - No retries anywhere in the pipeline

pub mod callback;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod options;
pub mod registry;
pub mod reply;
pub mod table;

pub use callback::{Callback, CallbackChain};
pub use context::Context;
pub use dispatcher::{Dispatcher, Outcome};
pub use error::RegistryError;
pub use options::HandlerOptions;
pub use registry::RegistryBuilder;
pub use reply::{Procedure, Reply, ReplyBody};
pub use table::{CompiledRoute, DispatchTable};
