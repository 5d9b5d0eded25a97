//! Error types for versync protocol logic.

use thiserror::Error;
use versync_types::{LibraryVersion, Method, ObjectType};

/// A request that cannot be built. Always a programmer error, raised
/// before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Parameter set has no `target`.
    #[error("'target' not provided")]
    MissingTarget,

    /// A required identifier was zero or absent.
    #[error("{0} not provided")]
    MissingId(&'static str),

    /// Operation needs an API key but none is configured.
    #[error("API key not set")]
    MissingApiKey,

    /// Method not allowed for this operation.
    #[error("invalid method '{0}'")]
    InvalidMethod(Method),

    /// Object type cannot be addressed by key.
    #[error("object type '{0}' cannot be selected by key")]
    UnsupportedObjectType(ObjectType),

    /// Operation needs at least one object key.
    #[error("no object keys provided")]
    NoKeys,

    /// Batch size must be at least one.
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
}

/// A response that breaks the versioning contract.
///
/// The caller must treat local sync state as indeterminate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Required version header absent from a successful response.
    #[error("{0} not provided")]
    MissingVersionHeader(&'static str),

    /// Version header present but not a non-negative integer.
    #[error("invalid {header} value {value:?}")]
    InvalidVersionHeader {
        /// Header name.
        header: &'static str,
        /// Raw header value.
        value: String,
    },

    /// Server reported a version older than the write precondition.
    #[error("library version went backwards: sent {sent}, received {received}")]
    VersionRegressed {
        /// Version sent as precondition.
        sent: LibraryVersion,
        /// Version returned by the server.
        received: LibraryVersion,
    },
}
