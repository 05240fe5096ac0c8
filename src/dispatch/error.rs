//! Registration faults.
//!
//! These describe programming errors in the set-up routine. They are never
//! returned to callers: the registry logs them and panics at the point of
//! misuse.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{operation} must be called before the pipeline is compiled")]
    Frozen { operation: &'static str },

    #[error("path prefix must not be empty")]
    EmptyPrefix,

    #[error("path prefix must start with '/' (got {0:?})")]
    RelativePrefix(String),

    #[error("message name must not be empty")]
    EmptyName,

    #[error("message name must not start with '/' (got {0:?})")]
    SlashedName(String),

    #[error("duplicate route {url} (message {name:?})")]
    DuplicateUrl { url: String, name: String },
}

/// Log and raise a registration fault.
#[track_caller]
pub(crate) fn fault(error: RegistryError) -> ! {
    tracing::error!(error = %error, "Dispatch registry misuse");
    panic!("{error}");
}
