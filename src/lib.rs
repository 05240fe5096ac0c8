//! Message dispatch over HTTP POST.
//!
//! Named messages are registered with a procedure and optional callbacks,
//! compiled once into an immutable dispatch table, and served at
//! `<prefix><name>`.

pub mod config;
pub mod demo;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::schema::ServerConfig;
pub use dispatch::{Callback, Context, HandlerOptions, RegistryBuilder, Reply};
pub use http::HttpServer;
pub use lifecycle::{compile_and_listen, Shutdown};
