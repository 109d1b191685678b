//! Synchronization-Core Error Hierarchy
//!
//! Defines the error types reported through the dispatch layer for object
//! manager operations, categorized by concern.

use config::ConfigError;

use crate::types::Handle;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Object-manager level failures (access checks, naming, parameters)
    #[error(transparent)]
    Object(#[from] ObjectError),

    /// Configuration validation failures
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectError {
    /// Required access right missing on the handle
    #[error("Access denied (required 0x{required:08x}, granted 0x{granted:08x})")]
    AccessDenied { required: u32, granted: u32 },

    /// Open-by-name found no object with the given name
    #[error("Object name not found: {0}")]
    NameNotFound(String),

    /// Handle or name refers to an object of another kind
    #[error("Object type mismatch (expected {expected}, found {found})")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Handle not present in the calling process handle table
    #[error("Invalid handle {0:?}")]
    InvalidHandle(Handle),

    /// Unrecognized opcode or malformed request argument
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The object kind has no signal operation
    #[error("{0} objects cannot be signaled")]
    NotSignalable(&'static str),

    /// Fast-path backend could not allocate a descriptor or shared-memory
    /// slot; the whole create operation fails
    #[error("Fast backend resource exhausted: {0}")]
    BackendExhausted(String),
}
