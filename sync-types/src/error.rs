//! Error types for versync shared types.

use thiserror::Error;

/// Errors raised while parsing or validating shared types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Library type is not one of `user`, `group`, `publications`
    #[error("unknown library type: {0}")]
    UnknownLibraryType(String),

    /// Object type is not one the API knows about
    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    /// HTTP method name not recognized
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// Library version is not a non-negative integer
    #[error("invalid library version: {0:?}")]
    InvalidVersion(String),
}
