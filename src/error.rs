//! Error types for the store and its bindings.

use thiserror::Error;

/// Errors surfaced by the store, the action binder and connections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// State must be an object at the top level.
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    /// No action is bound under this name.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The connection was already torn down.
    #[error("Connection is unsubscribed")]
    Disconnected,
}

/// Result type alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;
