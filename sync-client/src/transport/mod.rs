//! Transport abstraction for versync.
//!
//! This module provides a pluggable transport layer that abstracts
//! the underlying HTTP machinery (reqwest, mock for testing).
//!
//! # Design
//!
//! A transport performs exactly one HTTP exchange per call:
//! - `request()` sends an [`HttpRequest`] and resolves to the [`HttpResponse`]
//!
//! Transports report connection-level failures only. Any status code the
//! server returns is a successful exchange; deciding which codes are
//! acceptable is the client's job. Retrying dropped connections, redirects
//! and cookies are the transport's concern.
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new();
//! transport.queue_response(HttpResponse::new(200).with_body("[]"));
//! let response = transport.request(request).await?;
//! ```

mod http;
mod mock;

pub use http::{HttpTransport, HttpTransportConfig};
pub use mock::MockTransport;

use async_trait::async_trait;
use thiserror::Error;
use versync_types::{Headers, Method};

/// Transport errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the server.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Exchange did not finish in time.
    #[error("request timed out")]
    Timeout,

    /// Exchange was cancelled before completing.
    #[error("request cancelled")]
    Cancelled,

    /// Request could not be sent or the response could not be read.
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// How the transport should decode the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    /// Plain text.
    #[default]
    Text,
    /// Text, with the request advertising that JSON is expected.
    Json,
}

/// One fully-specified HTTP exchange.
///
/// Built fresh for every request and never modified after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: Method,
    /// Absolute URI.
    pub uri: String,
    /// Request headers.
    pub headers: Headers,
    /// Request body, if any.
    pub body: Option<String>,
    /// Bypass any HTTP cache.
    pub dont_cache: bool,
    /// Foreground requests take priority over background ones.
    pub foreground: bool,
    /// Response decoding mode.
    pub response_type: ResponseType,
}

impl HttpRequest {
    /// A request with no headers, no body and default flags.
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            headers: Headers::new(),
            body: None,
            dont_cache: false,
            foreground: true,
            response_type: ResponseType::Text,
        }
    }
}

/// A response received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Decoded body text.
    pub body: String,
}

impl HttpResponse {
    /// A response with the given status, no headers and an empty body.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: String::new(),
        }
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Value of response header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// Transport trait for performing HTTP exchanges.
///
/// Implementations handle the underlying connection mechanism
/// (reqwest, mock, etc).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one HTTP exchange.
    ///
    /// Returns `Ok` for every response the server sends, whatever its status.
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).request(request).await
    }
}
