//! HTTP host server subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → request.rs (request ID assigned / propagated)
//!     → DispatchTable lookup by exact path (404 if absent)
//!     → dispatch::Dispatcher (pre-chain, body, procedure, reply, post-chain)
//!     → response.rs (ResponseSink committed into the HTTP response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use response::ResponseSink;
pub use server::HttpServer;
