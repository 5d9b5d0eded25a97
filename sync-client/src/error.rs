//! The single error type returned by client operations.

use thiserror::Error;
use versync_core::{ProtocolError, RequestError};
use versync_types::{LibraryVersion, Method};

use crate::config::ConfigError;
use crate::transport::{HttpResponse, TransportError};

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// Configuration rejected.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Server response broke the versioning contract.
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// The library changed since the version sent as precondition.
    #[error("library has been modified since version {sent}")]
    PreconditionFailed {
        /// Version sent in `If-Unmodified-Since-Version`.
        sent: LibraryVersion,
        /// The 412 response.
        response: HttpResponse,
    },

    /// Status outside the request's success codes.
    #[error("unexpected status {status} for {method} {uri}")]
    UnexpectedStatus {
        /// Request method.
        method: Method,
        /// Request URI.
        uri: String,
        /// Response status.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Response body was not the expected JSON.
    #[error("invalid JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// Dispatcher no longer accepts work.
    #[error("dispatcher closed")]
    DispatcherClosed,
}

impl ClientError {
    /// HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::PreconditionFailed { response, .. } => Some(response.status),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server rejected the request with a 4xx status.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Whether the server failed with a 5xx status.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }

    /// Whether a write precondition failed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }

    /// Whether local sync state must be considered indeterminate.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }

    /// Whether repeating the same request might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(TransportError::Cancelled) => false,
            Self::Transport(_) => true,
            _ => self.is_server_error(),
        }
    }
}
